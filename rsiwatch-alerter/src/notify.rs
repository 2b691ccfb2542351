//! Notification dispatch — Telegram Bot API transport.
//!
//! Fire-and-forget: callers log a transport error and move on. Nothing here
//! retries and no delivery confirmation is tracked beyond the API's own
//! `ok` flag.

use rsiwatch_core::domain::{Signal, SignalReading, Timeframe};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("API rejected message: {0}")]
    Rejected(String),
}

/// Destination-plus-text message sink.
pub trait Notifier {
    /// Send a formatted text message to a chat. Markdown is allowed.
    fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Minimal slice of a Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{token}"))
    }

    /// Point the notifier at a different endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/sendMessage", self.base_url);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let body: ApiResponse = resp
            .json()
            .map_err(|e| NotifyError::Transport(format!("unreadable API response: {e}")))?;

        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description.unwrap_or_else(|| "no description".into()),
            ));
        }
        Ok(())
    }
}

/// Format an actionable alert message.
///
/// Callers only pass actionable readings; Neutral/Error use the buy layout
/// if they ever slip through, which is harmless.
pub fn format_alert(
    symbol: &str,
    timeframe: Timeframe,
    reading: &SignalReading,
    rsi_period: usize,
) -> String {
    let (icon, zone) = match reading.signal {
        Signal::SellClose => ("🔴", "overbought"),
        _ => ("🟢", "oversold"),
    };
    format!(
        "{icon} *ALERT {}* {icon}\nPair: `{symbol}` ({timeframe})\n\
         Price: *${:.2}*\nRSI ({rsi_period}): *{:.2}* ({zone} zone)",
        reading.signal, reading.price, reading.rsi
    )
}
