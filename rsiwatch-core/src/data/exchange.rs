//! Exchange data provider.
//!
//! Fetches OHLCV candles from the Binance public klines REST endpoint.
//! The endpoint needs no API key for market data. Klines come back as a
//! JSON array of arrays with string-encoded prices, ascending by open time.

use super::provider::{DataError, MarketDataProvider};
use crate::domain::{candle, Candle, Timeframe};
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://api.binance.com/api/v3/klines";

/// Binance REST data provider.
pub struct ExchangeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for ExchangeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different endpoint (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rsiwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Map a display symbol ("BTC/USDT") to the exchange's pair code ("BTCUSDT").
    fn pair_code(symbol: &str) -> String {
        symbol
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase()
    }

    /// Build the klines request URL.
    fn klines_url(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> String {
        format!(
            "{}?symbol={}&interval={}&limit={limit}",
            self.base_url,
            Self::pair_code(symbol),
            timeframe.code()
        )
    }

    /// Parse one kline row: [open_time_ms, open, high, low, close, volume, ...].
    ///
    /// Prices and volume are string-encoded decimals.
    fn parse_row(row: &Value) -> Result<Candle, DataError> {
        let fields = row
            .as_array()
            .ok_or_else(|| DataError::ResponseFormatChanged("kline row is not an array".into()))?;
        if fields.len() < 6 {
            return Err(DataError::ResponseFormatChanged(format!(
                "kline row has {} fields, expected at least 6",
                fields.len()
            )));
        }

        let ts_ms = fields[0]
            .as_i64()
            .ok_or_else(|| DataError::ResponseFormatChanged("open time is not an integer".into()))?;
        let timestamp = chrono::DateTime::from_timestamp_millis(ts_ms)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts_ms}"))
            })?;

        let decimal = |i: usize, name: &str| -> Result<f64, DataError> {
            fields[i]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("{name} is not a decimal string"))
                })
        };

        Ok(Candle {
            timestamp,
            open: decimal(1, "open")?,
            high: decimal(2, "high")?,
            low: decimal(3, "low")?,
            close: decimal(4, "close")?,
            volume: decimal(5, "volume")?,
        })
    }

    /// Parse the full klines response body.
    fn parse_response(symbol: &str, body: Value) -> Result<Vec<Candle>, DataError> {
        let rows = body
            .as_array()
            .ok_or_else(|| DataError::ResponseFormatChanged("response is not an array".into()))?;

        let candles = rows
            .iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>, _>>()?;

        if candles.is_empty() {
            return Err(DataError::EmptyResponse {
                symbol: symbol.to_string(),
            });
        }
        if !candle::is_ascending(&candles) {
            return Err(DataError::ResponseFormatChanged(
                "candles are not ascending by open time".into(),
            ));
        }

        Ok(candles)
    }

    /// Map a non-success status to a structured error.
    ///
    /// Binance reports an unknown symbol or interval as HTTP 400 with a
    /// `{"code": ..., "msg": ...}` body; 429 is a rate limit and 418 an
    /// outright IP ban after ignoring 429s.
    fn status_error(symbol: &str, status: reqwest::StatusCode, resp: reqwest::blocking::Response) -> DataError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status.as_u16() == 418
        {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return DataError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            let msg = resp
                .json::<Value>()
                .ok()
                .and_then(|v| v.get("msg").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_default();
            if msg.to_ascii_lowercase().contains("interval") {
                return DataError::UnsupportedTimeframe(msg);
            }
            return DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            };
        }

        DataError::Other(format!("HTTP {status} for {symbol}"))
    }
}

impl MarketDataProvider for ExchangeProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let url = self.klines_url(symbol, timeframe, limit);
        log::debug!("fetching {limit} {timeframe} candles for {symbol}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(symbol, status, resp));
        }

        let body: Value = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, body)
    }
}
