//! Alerter configuration — loaded once at startup, immutable afterwards.
//!
//! Credentials never live in code: the bot token and chat id come from the
//! TOML file or the `RSIWATCH_BOT_TOKEN` / `RSIWATCH_CHAT_ID` environment
//! variables (environment wins). A missing token is the one startup error
//! that aborts before any work begins.

use rsiwatch_core::analysis::AnalysisOptions;
use rsiwatch_core::data::DEFAULT_CANDLE_LIMIT;
use rsiwatch_core::domain::{Thresholds, Timeframe};
use rsiwatch_core::indicators::DEFAULT_RSI_PERIOD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("bot token is not configured (set [telegram].token or RSIWATCH_BOT_TOKEN)")]
    MissingToken,

    #[error("chat id is not configured (set [telegram].chat_id or RSIWATCH_CHAT_ID; use /getid to find yours)")]
    MissingChatId,

    #[error("invalid thresholds: oversold ({oversold}) must be below overbought ({overbought})")]
    InvalidThresholds { oversold: f64, overbought: f64 },

    #[error("watch list is empty")]
    EmptyWatchList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub symbols: Vec<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    /// Seconds between alert cycles in looped/bot mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Flat JSON file holding the last-dispatched signal per symbol.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_oversold")]
    pub oversold: f64,
    #[serde(default = "default_overbought")]
    pub overbought: f64,
    #[serde(default = "default_candle_limit")]
    pub candle_limit: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            oversold: 30.0,
            overbought: 70.0,
            candle_limit: DEFAULT_CANDLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlerterConfig {
    pub telegram: TelegramConfig,
    pub watch: WatchConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

fn default_timeframe() -> Timeframe {
    Timeframe::M15
}

fn default_interval_secs() -> u64 {
    300
}

fn default_state_file() -> PathBuf {
    PathBuf::from("last_signals.json")
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

fn default_candle_limit() -> usize {
    DEFAULT_CANDLE_LIMIT
}

impl AlerterConfig {
    /// Load from a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AlerterConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("RSIWATCH_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.token = token;
            }
        }
        if let Ok(chat_id) = std::env::var("RSIWATCH_CHAT_ID") {
            if !chat_id.is_empty() {
                self.telegram.chat_id = chat_id;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.watch.symbols.is_empty() {
            return Err(ConfigError::EmptyWatchList);
        }
        if self.strategy.oversold >= self.strategy.overbought {
            return Err(ConfigError::InvalidThresholds {
                oversold: self.strategy.oversold,
                overbought: self.strategy.overbought,
            });
        }
        Ok(())
    }

    /// Chat id is required for alert dispatch (but not for /getid discovery).
    pub fn require_chat_id(&self) -> Result<&str, ConfigError> {
        if self.telegram.chat_id.is_empty() {
            Err(ConfigError::MissingChatId)
        } else {
            Ok(&self.telegram.chat_id)
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            oversold: self.strategy.oversold,
            overbought: self.strategy.overbought,
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            rsi_period: self.strategy.rsi_period,
            thresholds: self.thresholds(),
            candle_limit: self.strategy.candle_limit,
        }
    }
}
