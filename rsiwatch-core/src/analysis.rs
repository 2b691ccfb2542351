//! Analysis pipeline — fetch, enrich, classify.
//!
//! The one composition every frontend uses: the CLI commands, the TUI
//! worker, the bot's `/analyse` handler, and the alert cycle all go through
//! `analyze`. Data flows strictly one way; nothing here reads back from a
//! downstream step.

use crate::data::{DataError, MarketDataProvider, DEFAULT_CANDLE_LIMIT};
use crate::domain::{Signal, SignalReading, Thresholds, Timeframe};
use crate::indicators::{enrich, IndicatorRow, DEFAULT_RSI_PERIOD};
use serde::{Deserialize, Serialize};

/// How many future candles the naive price projection covers.
pub const PROJECTION_STEPS: usize = 10;

/// Tunable analysis parameters with the conventional defaults
/// (14-period RSI, 30/70 thresholds, 500-candle window).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub rsi_period: usize,
    pub thresholds: Thresholds,
    pub candle_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            thresholds: Thresholds::default(),
            candle_limit: DEFAULT_CANDLE_LIMIT,
        }
    }
}

/// Everything a frontend needs to render one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub rows: Vec<IndicatorRow>,
    pub reading: SignalReading,
}

impl AnalysisReport {
    /// Span of the analyzed series in hours (zero for fewer than two rows).
    pub fn span_hours(&self) -> f64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => {
                (last.candle.timestamp - first.candle.timestamp).num_seconds() as f64 / 3600.0
            }
            _ => 0.0,
        }
    }

    /// Short one-line summary, used for log lines and CLI output.
    pub fn summary_line(&self, options: &AnalysisOptions) -> String {
        format!(
            "{} ({}) price ${:.2} RSI({}) {:.2} -> {}",
            self.symbol,
            self.timeframe,
            self.reading.price,
            options.rsi_period,
            self.reading.rsi,
            self.reading.signal
        )
    }
}

/// Run the fetch → enrich → classify pipeline for one symbol.
///
/// Provider failures propagate as `DataError`; how they surface is the
/// caller's concern (status-bar diagnostic in the dashboard, log-and-skip
/// in the alert cycle).
/// Naive price projection from the latest reading.
///
/// Starts at `last_close` and compounds one step per future candle: a buy
/// signal projects a rise, a sell signal a fall, anything else stays flat.
/// The per-step rate starts at 0.1% and ramps up with distance, so the
/// curve bends away from the last close. Returns `steps + 1` points, the
/// first being `last_close` itself.
///
/// This is a visual hint, not a model; it only encodes the signal's
/// direction.
pub fn project_prices(last_close: f64, signal: Signal, steps: usize) -> Vec<f64> {
    let direction = match signal {
        Signal::StrongBuy => 1.0,
        Signal::SellClose => -1.0,
        Signal::Neutral | Signal::Error => 0.0,
    };

    let mut prices = Vec::with_capacity(steps + 1);
    prices.push(last_close);
    for i in 0..steps {
        let rate = 0.001 * (1.0 + i as f64 / 20.0);
        let prev = prices[i];
        prices.push(prev * (1.0 + direction * rate));
    }
    prices
}

pub fn analyze(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    timeframe: Timeframe,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, DataError> {
    let candles = provider.fetch(symbol, timeframe, options.candle_limit)?;
    let rows = enrich(&candles, options.rsi_period);
    let reading = SignalReading::from_rows(&rows, options.thresholds);

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        timeframe,
        rows,
        reading,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, Signal};
    use crate::indicators::make_candles;

    /// Provider stub returning a canned series or error.
    pub struct FixedProvider {
        pub candles: Result<Vec<Candle>, fn() -> DataError>,
    }

    impl MarketDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _limit: usize,
        ) -> Result<Vec<Candle>, DataError> {
            match &self.candles {
                Ok(c) => Ok(c.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    #[test]
    fn pipeline_produces_reading_from_last_row() {
        // Monotonic gains drive RSI to 100 → SellClose at the default thresholds.
        let provider = FixedProvider {
            candles: Ok(make_candles(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>())),
        };
        let report = analyze(
            &provider,
            "BTC/USDT",
            Timeframe::H1,
            &AnalysisOptions::default(),
        )
        .unwrap();

        assert_eq!(report.rows.len(), 30 - DEFAULT_RSI_PERIOD);
        assert_eq!(report.reading.signal, Signal::SellClose);
        assert_eq!(report.reading.price, 129.0);
    }

    #[test]
    fn short_series_yields_error_reading_not_failure() {
        let provider = FixedProvider {
            candles: Ok(make_candles(&[100.0, 101.0])),
        };
        let report = analyze(
            &provider,
            "BTC/USDT",
            Timeframe::H1,
            &AnalysisOptions::default(),
        )
        .unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.reading.signal, Signal::Error);
        assert_eq!(report.reading.price, 0.0);
        assert_eq!(report.reading.rsi, 0.0);
    }

    #[test]
    fn provider_errors_propagate() {
        let provider = FixedProvider {
            candles: Err(|| DataError::SymbolNotFound {
                symbol: "NOPE/USDT".into(),
            }),
        };
        let err = analyze(
            &provider,
            "NOPE/USDT",
            Timeframe::H1,
            &AnalysisOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn projection_compounds_upward_on_buy_signal() {
        let prices = project_prices(100.0, Signal::StrongBuy, PROJECTION_STEPS);
        assert_eq!(prices.len(), PROJECTION_STEPS + 1);
        assert_eq!(prices[0], 100.0);
        // Step rates ramp: 0.1%, then 0.105% of the running price.
        crate::indicators::assert_approx(prices[1], 100.0 * 1.001, 1e-9);
        crate::indicators::assert_approx(prices[2], 100.0 * 1.001 * 1.00105, 1e-9);
        for pair in prices.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn projection_compounds_downward_on_sell_signal() {
        let prices = project_prices(200.0, Signal::SellClose, PROJECTION_STEPS);
        crate::indicators::assert_approx(prices[1], 200.0 * 0.999, 1e-9);
        for pair in prices.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(prices[PROJECTION_STEPS] > 0.0);
    }

    #[test]
    fn projection_is_flat_when_not_actionable() {
        for signal in [Signal::Neutral, Signal::Error] {
            let prices = project_prices(100.0, signal, PROJECTION_STEPS);
            assert!(prices.iter().all(|&p| p == 100.0), "{signal:?}");
        }
    }

    #[test]
    fn span_hours_over_hourly_candles() {
        let provider = FixedProvider {
            candles: Ok(make_candles(&vec![100.0; 20])),
        };
        let report = analyze(
            &provider,
            "BTC/USDT",
            Timeframe::H1,
            &AnalysisOptions::default(),
        )
        .unwrap();
        // 6 rows survive the 14-candle warm-up → 5 hourly steps.
        assert_eq!(report.span_hours(), 5.0);
    }
}
