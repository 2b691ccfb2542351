//! RsiWatch Core — domain types, data provider, RSI, signal classification, backtest.
//!
//! This crate contains the analysis pipeline shared by the TUI dashboard,
//! the CLI, and the alerter:
//! - Domain types (candles, timeframes, signals, trades)
//! - Market data provider trait with an exchange REST implementation
//! - Wilder-smoothed RSI with NaN-dropped alignment
//! - Threshold signal classifier (one function for live and backtest paths)
//! - Long-only backtest simulator with an append-only trade ledger

pub mod analysis;
pub mod backtest;
pub mod data;
pub mod domain;
pub mod indicators;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    ///
    /// The TUI worker thread moves analysis results across a channel, so
    /// everything it carries must be Send. If any type fails this check,
    /// the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::SignalReading>();
        require_sync::<domain::SignalReading>();
        require_send::<domain::Thresholds>();
        require_sync::<domain::Thresholds>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();

        require_send::<indicators::IndicatorRow>();
        require_sync::<indicators::IndicatorRow>();

        require_send::<backtest::BacktestReport>();
        require_sync::<backtest::BacktestReport>();

        require_send::<analysis::AnalysisReport>();
        require_sync::<analysis::AnalysisReport>();

        require_send::<data::DataError>();
        require_sync::<data::DataError>();
    }
}
