//! Market data fetching.

pub mod exchange;
pub mod provider;

pub use exchange::ExchangeProvider;
pub use provider::{DataError, MarketDataProvider, DEFAULT_CANDLE_LIMIT};
