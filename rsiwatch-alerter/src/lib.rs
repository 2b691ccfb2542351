//! RsiWatch Alerter — watch-list polling and chat notifications.
//!
//! This crate builds on `rsiwatch-core` to provide:
//! - TOML configuration with environment overrides for credentials
//! - Persisted per-symbol signal state (flat JSON, atomic write)
//! - Telegram notification dispatch (fire-and-forget)
//! - The per-symbol alert state machine and watch cycle
//! - An interactive command bot with an interleaved periodic alert job

pub mod bot;
pub mod config;
pub mod cycle;
pub mod notify;
pub mod state;

pub use bot::{run_bot, BotError};
pub use config::{AlerterConfig, ConfigError, StrategyConfig, TelegramConfig, WatchConfig};
pub use cycle::{evaluate_transition, run_cycle, CycleOutcome, Transition};
pub use notify::{format_alert, Notifier, NotifyError, TelegramNotifier};
pub use state::{SignalStore, StateError};
