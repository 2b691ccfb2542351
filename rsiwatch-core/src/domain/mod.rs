//! Domain types for RsiWatch.

pub mod candle;
pub mod signal;
pub mod timeframe;
pub mod trade;

pub use candle::Candle;
pub use signal::{classify, Signal, SignalReading, Thresholds};
pub use timeframe::{Timeframe, TimeframeParseError};
pub use trade::{TradeRecord, TradeSide};
