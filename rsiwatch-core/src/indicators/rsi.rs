//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses:
//! the first value is seeded with a simple average over the first `period`
//! deltas, subsequent values roll with alpha = 1/period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss); avg_loss == 0 → RSI = 100.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// Default RSI lookback window.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// A candle with its aligned RSI value. Rows that fall inside the warm-up
/// window never become `IndicatorRow`s — `enrich` drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub candle: Candle,
    pub rsi: f64,
}

/// Compute the RSI series aligned to `candles`.
///
/// Returns one value per input candle; indices before the first valid value
/// (the first `period` candles) are NaN.
pub fn rsi_series(candles: &[Candle], period: usize) -> Vec<f64> {
    assert!(period >= 1, "RSI period must be >= 1");

    let n = candles.len();
    let mut result = vec![f64::NAN; n];

    if n < period + 1 {
        return result;
    }

    // Price deltas; changes[0] is undefined.
    let mut changes = vec![f64::NAN; n];
    for i in 1..n {
        changes[i] = candles[i].close - candles[i - 1].close;
    }

    // Seed: simple average gain and loss over the first `period` deltas.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = rsi_value(avg_gain, avg_loss);

    // Wilder smoothing for subsequent values.
    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let gain = if changes[i] > 0.0 { changes[i] } else { 0.0 };
        let loss = if changes[i] < 0.0 { -changes[i] } else { 0.0 };

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = rsi_value(avg_gain, avg_loss);
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Join the RSI column onto the candle series, dropping warm-up rows.
///
/// Output length is `candles.len() - period` when the input is long enough,
/// otherwise empty.
pub fn enrich(candles: &[Candle], period: usize) -> Vec<IndicatorRow> {
    let values = rsi_series(candles, period);
    candles
        .iter()
        .zip(values)
        .filter(|(_, rsi)| !rsi.is_nan())
        .map(|(candle, rsi)| IndicatorRow {
            candle: candle.clone(),
            rsi,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn rsi_all_gains_is_100() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = rsi_series(&candles, 3);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = rsi_series(&candles, 3);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_seed_value() {
        // Closes: 44, 44.34, 44.09, 43.61, 44.33
        // Deltas: +0.34, -0.25, -0.48, +0.72
        // period=3, seed: avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100/(1 + 0.34/0.73) = 31.7757...
        let candles = make_candles(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = rsi_series(&candles, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_flat_series_reads_100() {
        // No losses at all, so avg_loss stays 0 and the 100 branch applies.
        let candles = make_candles(&[100.0; 6]);
        let result = rsi_series(&candles, 3);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for (i, v) in rsi_series(&candles, 3).iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn enrich_drops_warmup_rows() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let rows = enrich(&candles, 3);
        assert_eq!(rows.len(), candles.len() - 3);
        assert_eq!(rows[0].candle.timestamp, candles[3].timestamp);
    }

    #[test]
    fn enrich_short_series_is_empty() {
        for len in 0..4 {
            let candles = make_candles(&vec![100.0; len]);
            assert!(enrich(&candles, 14).is_empty(), "len={len}");
            assert!(enrich(&candles, len.max(1)).is_empty(), "len={len}");
        }
    }

    #[test]
    fn enrich_empty_input_is_empty() {
        assert!(enrich(&[], DEFAULT_RSI_PERIOD).is_empty());
    }
}
