//! RsiWatch TUI — RSI dashboard with live signal, backtest, and charts.
//!
//! Panels:
//! 1. Config — pair, interval, thresholds, starting capital
//! 2. Signal — live reading and backtest summary
//! 3. Charts — close price, RSI with threshold lines, volume
//! 4. Trades — the simulated trade ledger
//! 5. Help — keyboard shortcuts

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rsiwatch")
        .join("state.json");

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx);

    // Build app state and apply persisted preferences.
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, state_path.clone());
    persistence::apply(&mut app, persistence::load(&state_path));

    // First analysis kicks off immediately with the restored inputs.
    app.request_analysis();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save preferences before exit.
    let _ = persistence::save(&state_path, &persistence::extract(&app));

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::AnalysisDone { report, backtest } => {
            app.analysis_in_progress = false;
            match report.rows.len() {
                0 => app.set_warning(format!(
                    "{}: not enough history to compute RSI",
                    report.symbol
                )),
                n => app.set_status(format!(
                    "{} ({}): {} over {n} rows",
                    report.symbol, report.timeframe, report.reading.signal
                )),
            }
            app.report = Some(*report);
            app.backtest = Some(*backtest);
        }
        WorkerResponse::AnalysisFailed { symbol, error } => {
            app.analysis_in_progress = false;
            // Failures surface as an empty dashboard plus a diagnostic,
            // never a crash.
            app.report = None;
            app.backtest = None;
            app.set_error(format!("Could not load data for {symbol}: {error}"));
        }
    }
}
