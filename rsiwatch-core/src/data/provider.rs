//! Data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over the exchange REST client so
//! callers can swap implementations and mock for tests.

use crate::domain::{Candle, Timeframe};
use thiserror::Error;

/// Number of candles requested when the caller does not say otherwise.
pub const DEFAULT_CANDLE_LIMIT: usize = 500;

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI, TUI, and log contexts.
/// No variant is retried anywhere — a fetch failure is terminal for that
/// symbol and cycle.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("unsupported timeframe: {0}")]
    UnsupportedTimeframe(String),

    #[error("provider returned no data for {symbol}")]
    EmptyResponse { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market data providers.
///
/// Implementations return the most recent `limit` candles for a symbol and
/// timeframe, ascending by timestamp.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the most recent `limit` OHLCV candles.
    fn fetch(&self, symbol: &str, timeframe: Timeframe, limit: usize)
        -> Result<Vec<Candle>, DataError>;
}
