//! Indicator computation.
//!
//! The only indicator the pipeline needs is RSI. It is computed once over
//! the full candle series and joined to the candles as `IndicatorRow`s,
//! dropping the warm-up rows that have no value yet.

pub mod rsi;

pub use rsi::{enrich, rsi_series, IndicatorRow, DEFAULT_RSI_PERIOD};

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev close (or close for the first
/// candle), high/low bracket open and close, volume = 1000. Timestamps are
/// hourly starting 2024-01-02 00:00.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create indicator rows directly from (close, rsi) pairs for testing.
#[cfg(test)]
pub fn make_rows(pairs: &[(f64, f64)]) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = pairs.iter().map(|&(c, _)| c).collect();
    make_candles(&closes)
        .into_iter()
        .zip(pairs.iter())
        .map(|(candle, &(_, rsi))| IndicatorRow { candle, rsi })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
