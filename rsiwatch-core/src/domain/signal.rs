//! Trading signal — threshold classification of the latest RSI reading.
//!
//! One pure `classify` function serves both the live-signal path and the
//! backtest simulator, so the two can never drift apart.

use crate::indicators::IndicatorRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal state derived from the latest RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    SellClose,
    Neutral,
    /// Input series was empty — no reading available.
    Error,
}

impl Signal {
    /// True for the two signal states that warrant a notification.
    pub fn is_actionable(self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::SellClose)
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::SellClose => "SELL/CLOSE",
            Signal::Neutral => "NEUTRAL",
            Signal::Error => "ERROR",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// RSI cutoffs. Invariant: oversold < overbought.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Classify one RSI value against the thresholds.
///
/// Strict inequalities only: a reading exactly at a threshold is Neutral.
pub fn classify(rsi: f64, thresholds: Thresholds) -> Signal {
    if rsi < thresholds.oversold {
        Signal::StrongBuy
    } else if rsi > thresholds.overbought {
        Signal::SellClose
    } else {
        Signal::Neutral
    }
}

/// Signal plus the price and RSI it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub signal: Signal,
    pub price: f64,
    pub rsi: f64,
}

impl SignalReading {
    /// Classify the last row of an indicator series.
    ///
    /// An empty series yields the Error reading with price = 0, rsi = 0.
    pub fn from_rows(rows: &[IndicatorRow], thresholds: Thresholds) -> Self {
        match rows.last() {
            Some(last) => Self {
                signal: classify(last.rsi, thresholds),
                price: last.candle.close,
                rsi: last.rsi,
            },
            None => Self {
                signal: Signal::Error,
                price: 0.0,
                rsi: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_rows;

    #[test]
    fn classify_below_oversold_is_strong_buy() {
        assert_eq!(classify(29.99, Thresholds::default()), Signal::StrongBuy);
    }

    #[test]
    fn classify_above_overbought_is_sell_close() {
        assert_eq!(classify(70.01, Thresholds::default()), Signal::SellClose);
    }

    #[test]
    fn classify_between_is_neutral() {
        assert_eq!(classify(50.0, Thresholds::default()), Signal::Neutral);
    }

    #[test]
    fn classify_at_exact_thresholds_is_neutral() {
        let t = Thresholds::default();
        assert_eq!(classify(30.0, t), Signal::Neutral);
        assert_eq!(classify(70.0, t), Signal::Neutral);
    }

    #[test]
    fn reading_from_empty_series_is_error() {
        let reading = SignalReading::from_rows(&[], Thresholds::default());
        assert_eq!(reading.signal, Signal::Error);
        assert_eq!(reading.price, 0.0);
        assert_eq!(reading.rsi, 0.0);
    }

    #[test]
    fn reading_uses_last_row_only() {
        let rows = make_rows(&[(100.0, 75.0), (98.0, 25.0)]);
        let reading = SignalReading::from_rows(&rows, Thresholds::default());
        assert_eq!(reading.signal, Signal::StrongBuy);
        assert_eq!(reading.price, 98.0);
        assert_eq!(reading.rsi, 25.0);
    }

    #[test]
    fn signal_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Signal::StrongBuy).unwrap(),
            "\"STRONG_BUY\""
        );
        assert_eq!(
            serde_json::to_string(&Signal::SellClose).unwrap(),
            "\"SELL_CLOSE\""
        );
        let s: Signal = serde_json::from_str("\"NEUTRAL\"").unwrap();
        assert_eq!(s, Signal::Neutral);
    }
}
