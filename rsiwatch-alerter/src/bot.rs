//! Interactive command bot — long-poll loop with an interleaved alert job.
//!
//! Single-process, cooperative: each `getUpdates` poll and each command is
//! handled to completion before the next, and the periodic alert job runs
//! between polls when its interval has elapsed. The analysis pipeline is
//! never run concurrently with itself.
//!
//! Commands:
//! - `/start` — help text
//! - `/analyse <symbol> <timeframe>` — on-demand signal report
//! - `/getid` — reply with the caller's chat id (one-time configuration aid)

use crate::config::AlerterConfig;
use crate::cycle::run_cycle;
use crate::notify::{Notifier, TelegramNotifier};
use crate::state::SignalStore;
use rsiwatch_core::analysis::analyze;
use rsiwatch_core::data::MarketDataProvider;
use rsiwatch_core::domain::{Signal, Timeframe};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long one `getUpdates` call blocks server-side. Also bounds how stale
/// the alert-job clock can get.
const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    State(#[from] crate::state::StateError),
}

// ── Bot API wire types (the slice we consume) ────────────────────────

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    description: Option<String>,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Blocking `getUpdates` client.
struct BotClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BotClient {
    fn new(token: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            // Must outlive the server-side long-poll timeout.
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        let url = format!(
            "{}/getUpdates?offset={offset}&timeout={POLL_TIMEOUT_SECS}",
            self.base_url
        );
        let resp: UpdatesResponse = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BotError::Transport(e.to_string()))?
            .json()
            .map_err(|e| BotError::Transport(format!("unreadable API response: {e}")))?;

        if !resp.ok {
            return Err(BotError::Api(
                resp.description.unwrap_or_else(|| "no description".into()),
            ));
        }
        Ok(resp.result)
    }
}

/// Build the reply for one incoming message. Returns None for non-commands.
///
/// Kept free of transport so the command surface is unit-testable.
pub fn handle_command(
    text: &str,
    chat_id: i64,
    provider: &dyn MarketDataProvider,
    config: &AlerterConfig,
) -> Option<String> {
    let mut parts = text.split_whitespace();
    // Strip the @BotName suffix used in group chats.
    let command = parts.next()?.split('@').next()?;

    match command {
        "/start" | "/help" => Some(
            "Welcome to the RSI watch bot!\n\n\
             Use /analyse <symbol> <timeframe> for an on-demand signal.\n\
             Example: `/analyse BTC/USDT 4h`\n\
             Timeframes: 15m, 30m, 1h, 4h, 1d.\n\n\
             To configure automatic alerts, use /getid."
                .to_string(),
        ),
        "/getid" => Some(format!(
            "Your chat id is: `{chat_id}`\n\nPut it in the `[telegram]` \
             section of the config file (or RSIWATCH_CHAT_ID) to receive \
             automatic alerts."
        )),
        "/analyse" | "/analyze" => {
            let (symbol, tf_arg) = match (parts.next(), parts.next(), parts.next()) {
                (Some(symbol), Some(tf), None) => (symbol.to_uppercase(), tf.to_string()),
                _ => {
                    return Some(
                        "Wrong format. Use: `/analyse <symbol> <timeframe>`\n\
                         Example: `/analyse BTC/USDT 4h`"
                            .to_string(),
                    )
                }
            };

            let timeframe: Timeframe = match tf_arg.parse() {
                Ok(tf) => tf,
                Err(e) => return Some(format!("❌ {e}")),
            };

            let options = config.analysis_options();
            let report = match analyze(provider, &symbol, timeframe, &options) {
                Ok(report) => report,
                Err(e) => {
                    log::warn!("analysis for {symbol} failed: {e}");
                    return Some(format!(
                        "❌ Could not load data for {symbol} on {timeframe}. \
                         Check the pair and timeframe."
                    ));
                }
            };

            if report.reading.signal == Signal::Error {
                return Some(format!(
                    "❌ Not enough history to compute RSI for {symbol} on {timeframe}."
                ));
            }

            let icon = match report.reading.signal {
                Signal::StrongBuy => "🟢",
                Signal::SellClose => "🔴",
                _ => "🟡",
            };
            Some(format!(
                "--- *ANALYSIS {symbol} ({timeframe})* ---\n\n\
                 *Price:* ${:.2}\n*RSI ({}):* {:.2}\n\n\
                 *Signal:* {icon} *{}*\n\n\
                 _Buy (oversold):_ RSI < {}\n_Sell (overbought):_ RSI > {}",
                report.reading.price,
                options.rsi_period,
                report.reading.rsi,
                report.reading.signal,
                options.thresholds.oversold,
                options.thresholds.overbought,
            ))
        }
        _ => None,
    }
}

/// Run the bot until the process is terminated.
///
/// Transport errors on a poll are logged and the loop continues after a
/// short pause; only state-file write failures propagate.
pub fn run_bot(provider: &dyn MarketDataProvider, config: &AlerterConfig) -> Result<(), BotError> {
    let api = BotClient::new(&config.telegram.token);
    let notifier = TelegramNotifier::new(&config.telegram.token);
    let store = SignalStore::new(&config.watch.state_file);
    let interval = Duration::from_secs(config.watch.interval_secs);

    let mut offset = 0i64;
    // First alert cycle runs immediately.
    let mut next_alert_run = Instant::now();

    log::info!(
        "bot running: {} watched symbols, alert job every {}s",
        config.watch.symbols.len(),
        config.watch.interval_secs
    );

    loop {
        if Instant::now() >= next_alert_run {
            if config.telegram.chat_id.is_empty() {
                log::warn!("alert job skipped: chat id not configured (use /getid)");
            } else {
                match run_cycle(provider, &notifier, &store, config) {
                    Ok(outcome) => log::info!(
                        "alert cycle: {} checked, {} alerted, {} skipped",
                        outcome.checked,
                        outcome.alerts_sent,
                        outcome.skipped
                    ),
                    Err(e) => return Err(e.into()),
                }
            }
            next_alert_run = Instant::now() + interval;
        }

        let updates = match api.get_updates(offset) {
            Ok(updates) => updates,
            Err(e) => {
                log::error!("poll failed: {e}");
                std::thread::sleep(Duration::from_secs(5));
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            let Some(text) = message.text.as_deref() else { continue };

            if let Some(reply) = handle_command(text, message.chat.id, provider, config) {
                if let Err(e) = notifier.send(&message.chat.id.to_string(), &reply) {
                    log::error!("failed to reply in chat {}: {e}", message.chat.id);
                }
            }
        }
    }
}
