//! Background worker thread — fetch and compute off the render loop.
//!
//! Communication with the main thread is via `mpsc` channels. Commands are
//! processed strictly one at a time; the pipeline never runs concurrently
//! with itself.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use rsiwatch_core::analysis::{analyze, AnalysisOptions, AnalysisReport};
use rsiwatch_core::backtest::{run_backtest, BacktestReport};
use rsiwatch_core::data::ExchangeProvider;
use rsiwatch_core::domain::Timeframe;

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Analyze {
        symbol: String,
        timeframe: Timeframe,
        options: AnalysisOptions,
        capital: f64,
    },
    Shutdown,
}

/// Responses sent from the worker back to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    AnalysisDone {
        report: Box<AnalysisReport>,
        backtest: Box<BacktestReport>,
    },
    AnalysisFailed {
        symbol: String,
        error: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let provider = ExchangeProvider::new();

        while let Ok(command) = rx.recv() {
            match command {
                WorkerCommand::Analyze {
                    symbol,
                    timeframe,
                    options,
                    capital,
                } => {
                    let response = match analyze(&provider, &symbol, timeframe, &options) {
                        Ok(report) => {
                            let backtest =
                                run_backtest(&report.rows, options.thresholds, capital);
                            WorkerResponse::AnalysisDone {
                                report: Box::new(report),
                                backtest: Box::new(backtest),
                            }
                        }
                        Err(e) => WorkerResponse::AnalysisFailed {
                            symbol,
                            error: e.to_string(),
                        },
                    };
                    if tx.send(response).is_err() {
                        break; // UI gone
                    }
                }
                WorkerCommand::Shutdown => break,
            }
        }
    })
}
