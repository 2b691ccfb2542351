//! Application state — single-owner, main-thread only.
//!
//! All dashboard state lives here. The worker thread communicates via
//! channels; nothing else is shared.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use rsiwatch_core::analysis::{AnalysisOptions, AnalysisReport};
use rsiwatch_core::backtest::BacktestReport;
use rsiwatch_core::domain::{Thresholds, Timeframe};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Config,
    Signal,
    Chart,
    Trades,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Config => 0,
            Panel::Signal => 1,
            Panel::Chart => 2,
            Panel::Trades => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Config),
            1 => Some(Panel::Signal),
            2 => Some(Panel::Chart),
            3 => Some(Panel::Trades),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Config => "Config",
            Panel::Signal => "Signal",
            Panel::Chart => "Charts",
            Panel::Trades => "Trades",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 5).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 4) % 5).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Which config field is selected for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Symbol,
    Timeframe,
    Oversold,
    Overbought,
    Capital,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::Symbol,
        ConfigField::Timeframe,
        ConfigField::Oversold,
        ConfigField::Overbought,
        ConfigField::Capital,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfigField::Symbol => "Pair",
            ConfigField::Timeframe => "Interval",
            ConfigField::Oversold => "RSI oversold (buy)",
            ConfigField::Overbought => "RSI overbought (sell)",
            ConfigField::Capital => "Starting capital (USDT)",
        }
    }

    pub fn next(self) -> ConfigField {
        let i = Self::ALL.iter().position(|&f| f == self).unwrap();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> ConfigField {
        let i = Self::ALL.iter().position(|&f| f == self).unwrap();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// All dashboard state.
pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,

    // ── Analysis inputs ──
    pub symbol: String,
    pub timeframe: Timeframe,
    pub oversold: f64,
    pub overbought: f64,
    pub capital: f64,
    pub selected_field: ConfigField,

    // ── Analysis outputs ──
    pub report: Option<AnalysisReport>,
    pub backtest: Option<BacktestReport>,
    pub analysis_in_progress: bool,

    // ── Status line ──
    pub status_message: Option<(String, StatusLevel)>,

    // ── Infrastructure ──
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        state_path: PathBuf,
    ) -> Self {
        Self {
            running: true,
            active_panel: Panel::Config,
            symbol: "BTC/USDT".to_string(),
            timeframe: Timeframe::H1,
            oversold: 30.0,
            overbought: 70.0,
            capital: 1000.0,
            selected_field: ConfigField::Symbol,
            report: None,
            backtest: None,
            analysis_in_progress: false,
            status_message: None,
            worker_tx,
            worker_rx,
            state_path,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            oversold: self.oversold,
            overbought: self.overbought,
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            thresholds: self.thresholds(),
            ..AnalysisOptions::default()
        }
    }

    /// Ask the worker to re-run the pipeline with the current inputs.
    pub fn request_analysis(&mut self) {
        if self.analysis_in_progress {
            return;
        }
        self.analysis_in_progress = true;
        self.set_status(format!("Analyzing {} ({})...", self.symbol, self.timeframe));
        let _ = self.worker_tx.send(WorkerCommand::Analyze {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            options: self.analysis_options(),
            capital: self.capital,
        });
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Adjust the selected numeric field by one step, keeping the
    /// threshold ordering (oversold < overbought) intact.
    pub fn adjust_selected(&mut self, up: bool) {
        let step = if up { 1.0 } else { -1.0 };
        match self.selected_field {
            ConfigField::Symbol => {}
            ConfigField::Timeframe => {
                self.timeframe = if up {
                    self.timeframe.next()
                } else {
                    self.timeframe.prev()
                };
            }
            ConfigField::Oversold => {
                self.oversold = (self.oversold + step).clamp(1.0, self.overbought - 1.0);
            }
            ConfigField::Overbought => {
                self.overbought = (self.overbought + step).clamp(self.oversold + 1.0, 99.0);
            }
            ConfigField::Capital => {
                let step = if up { 50.0 } else { -50.0 };
                self.capital = (self.capital + step).max(10.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    pub fn test_app() -> AppState {
        let (tx, _keep_rx) = mpsc::channel();
        let (_keep_tx, rx) = mpsc::channel::<WorkerResponse>();
        // Leak the far channel ends so sends don't fail in tests.
        std::mem::forget(_keep_rx);
        std::mem::forget(_keep_tx);
        AppState::new(tx, rx, PathBuf::from("/tmp/rsiwatch-test-state.json"))
    }

    #[test]
    fn panel_cycle_is_closed() {
        for panel in [Panel::Config, Panel::Signal, Panel::Chart, Panel::Trades, Panel::Help] {
            assert_eq!(panel.next().prev(), panel);
        }
    }

    #[test]
    fn thresholds_keep_ordering_when_adjusted() {
        let mut app = test_app();
        app.selected_field = ConfigField::Oversold;
        for _ in 0..100 {
            app.adjust_selected(true);
        }
        assert!(app.oversold < app.overbought);

        app.selected_field = ConfigField::Overbought;
        for _ in 0..100 {
            app.adjust_selected(false);
        }
        assert!(app.oversold < app.overbought);
    }

    #[test]
    fn capital_never_drops_below_minimum() {
        let mut app = test_app();
        app.selected_field = ConfigField::Capital;
        for _ in 0..100 {
            app.adjust_selected(false);
        }
        assert_eq!(app.capital, 10.0);
    }

    #[test]
    fn request_analysis_is_debounced_while_in_progress() {
        let mut app = test_app();
        app.request_analysis();
        assert!(app.analysis_in_progress);
        // A second request while the first is running is a no-op.
        app.request_analysis();
        assert!(app.analysis_in_progress);
    }
}
