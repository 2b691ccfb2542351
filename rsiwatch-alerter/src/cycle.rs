//! The alert state machine and watch cycle.
//!
//! One poll cycle walks the watch list sequentially: fetch, classify,
//! compare against the stored signal, and dispatch on change. State is read
//! fully before the first symbol and written fully after the last. A fetch
//! failure skips the symbol and leaves its stored state untouched; a
//! transport failure is logged and does not abort the remaining symbols.

use crate::config::AlerterConfig;
use crate::notify::{format_alert, Notifier};
use crate::state::{SignalStore, StateError};
use rsiwatch_core::analysis::analyze;
use rsiwatch_core::data::MarketDataProvider;
use rsiwatch_core::domain::Signal;

/// What the state machine decided for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Actionable signal that differs from the stored one: notify and store.
    Notify,
    /// Neutral after an actionable (or unknown) signal: store silently,
    /// re-arming future alerts.
    Rearm,
    /// No state change, no notification.
    Hold,
}

/// Evaluate the per-symbol transition rule.
///
/// `stored` is None for a symbol that has never alerted. Non-actionable
/// current signals never notify; an Error reading (failed or empty series)
/// always holds.
pub fn evaluate_transition(current: Signal, stored: Option<Signal>) -> Transition {
    match current {
        Signal::StrongBuy | Signal::SellClose => {
            if stored == Some(current) {
                Transition::Hold
            } else {
                Transition::Notify
            }
        }
        Signal::Neutral => {
            if stored == Some(Signal::Neutral) {
                Transition::Hold
            } else {
                Transition::Rearm
            }
        }
        Signal::Error => Transition::Hold,
    }
}

/// Summary of one watch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub checked: usize,
    pub alerts_sent: usize,
    pub rearmed: usize,
    pub skipped: usize,
}

/// Run one alert cycle over the configured watch list.
///
/// Only the state-file write can fail; everything per-symbol is recovered
/// locally (logged and counted in the outcome).
pub fn run_cycle(
    provider: &dyn MarketDataProvider,
    notifier: &dyn Notifier,
    store: &SignalStore,
    config: &AlerterConfig,
) -> Result<CycleOutcome, StateError> {
    let options = config.analysis_options();
    let timeframe = config.watch.timeframe;
    let mut state = store.load();
    let mut outcome = CycleOutcome::default();

    log::info!(
        "checking {} symbols on {timeframe}",
        config.watch.symbols.len()
    );

    for symbol in &config.watch.symbols {
        outcome.checked += 1;

        let report = match analyze(provider, symbol, timeframe, &options) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("skipping {symbol}: {e}");
                outcome.skipped += 1;
                continue;
            }
        };

        let current = report.reading.signal;
        match evaluate_transition(current, state.get(symbol.as_str()).copied()) {
            Transition::Notify => {
                let chat_id = match config.require_chat_id() {
                    Ok(id) => id,
                    Err(e) => {
                        log::warn!("alert for {symbol} not sent: {e}");
                        continue;
                    }
                };
                let message =
                    format_alert(symbol, timeframe, &report.reading, options.rsi_period);
                // Fire-and-forget: the state advances even when the
                // transport fails, so each signal change dispatches at
                // most once.
                if let Err(e) = notifier.send(chat_id, &message) {
                    log::error!("failed to notify for {symbol}: {e}");
                } else {
                    log::info!("sent: {symbol} is {current}");
                }
                state.insert(symbol.clone(), current);
                outcome.alerts_sent += 1;
            }
            Transition::Rearm => {
                log::debug!("{symbol} reset to {current}");
                state.insert(symbol.clone(), current);
                outcome.rearmed += 1;
            }
            Transition::Hold => {
                log::debug!("{symbol}: no change ({current})");
            }
        }
    }

    store.save(&state)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use rsiwatch_core::data::DataError;
    use rsiwatch_core::domain::{Candle, Timeframe};
    use std::cell::RefCell;
    use std::collections::HashMap;

    // ── Test doubles ─────────────────────────────────────────────────

    /// Provider scripted per symbol: Some(closes) or None for a fetch failure.
    struct ScriptedProvider {
        by_symbol: HashMap<String, Option<Vec<f64>>>,
    }

    impl ScriptedProvider {
        fn new(entries: &[(&str, Option<Vec<f64>>)]) -> Self {
            Self {
                by_symbol: entries
                    .iter()
                    .map(|(s, c)| (s.to_string(), c.clone()))
                    .collect(),
            }
        }
    }

    impl MarketDataProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(
            &self,
            symbol: &str,
            _timeframe: Timeframe,
            _limit: usize,
        ) -> Result<Vec<Candle>, DataError> {
            match self.by_symbol.get(symbol) {
                Some(Some(closes)) => Ok(make_candles(closes)),
                _ => Err(DataError::NetworkUnreachable("scripted outage".into())),
            }
        }
    }

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: base + chrono::Duration::minutes(15 * i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.01),
                close,
                volume: 1000.0,
            })
            .collect()
    }

    /// 20 rising closes → RSI 100 → SellClose at default thresholds.
    fn sell_series() -> Vec<f64> {
        (0..20).map(|i| 100.0 + i as f64).collect()
    }

    /// 20 falling closes → RSI 0 → StrongBuy.
    fn buy_series() -> Vec<f64> {
        (0..20).map(|i| 100.0 - i as f64).collect()
    }

    /// Alternating closes land RSI mid-range → Neutral.
    fn neutral_series() -> Vec<f64> {
        (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect()
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("scripted failure".into()));
            }
            self.sent
                .borrow_mut()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn test_config(symbols: &[&str], dir: &std::path::Path) -> AlerterConfig {
        toml::from_str::<AlerterConfig>(&format!(
            r#"
            [telegram]
            token = "123:abc"
            chat_id = "42"

            [watch]
            symbols = [{}]
            timeframe = "15m"
            state_file = "{}"
        "#,
            symbols
                .iter()
                .map(|s| format!("\"{s}\""))
                .collect::<Vec<_>>()
                .join(", "),
            dir.join("last_signals.json").display()
        ))
        .unwrap()
    }

    // ── Transition rule ──────────────────────────────────────────────

    #[test]
    fn first_actionable_signal_notifies() {
        assert_eq!(
            evaluate_transition(Signal::StrongBuy, None),
            Transition::Notify
        );
        assert_eq!(
            evaluate_transition(Signal::SellClose, Some(Signal::Neutral)),
            Transition::Notify
        );
    }

    #[test]
    fn repeated_actionable_signal_is_suppressed() {
        assert_eq!(
            evaluate_transition(Signal::StrongBuy, Some(Signal::StrongBuy)),
            Transition::Hold
        );
    }

    #[test]
    fn actionable_flip_notifies() {
        assert_eq!(
            evaluate_transition(Signal::SellClose, Some(Signal::StrongBuy)),
            Transition::Notify
        );
    }

    #[test]
    fn neutral_rearms_silently() {
        assert_eq!(
            evaluate_transition(Signal::Neutral, Some(Signal::StrongBuy)),
            Transition::Rearm
        );
        assert_eq!(
            evaluate_transition(Signal::Neutral, Some(Signal::Neutral)),
            Transition::Hold
        );
    }

    #[test]
    fn error_reading_never_touches_state() {
        for stored in [None, Some(Signal::StrongBuy), Some(Signal::Neutral)] {
            assert_eq!(evaluate_transition(Signal::Error, stored), Transition::Hold);
        }
    }

    // ── Full cycle ───────────────────────────────────────────────────

    #[test]
    fn suppress_then_rearm_then_notify() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&["BTC/USDT"], dir.path());
        let store = SignalStore::new(&config.watch.state_file);
        let notifier = RecordingNotifier::default();

        // Seed stored state: STRONG_BUY already dispatched.
        let mut seed = HashMap::new();
        seed.insert("BTC/USDT".to_string(), Signal::StrongBuy);
        store.save(&seed).unwrap();

        // Cycle 1: still StrongBuy → suppressed.
        let provider = ScriptedProvider::new(&[("BTC/USDT", Some(buy_series()))]);
        let outcome = run_cycle(&provider, &notifier, &store, &config).unwrap();
        assert_eq!(outcome.alerts_sent, 0);
        assert!(notifier.sent.borrow().is_empty());

        // Cycle 2: Neutral → silent re-arm.
        let provider = ScriptedProvider::new(&[("BTC/USDT", Some(neutral_series()))]);
        let outcome = run_cycle(&provider, &notifier, &store, &config).unwrap();
        assert_eq!(outcome.rearmed, 1);
        assert!(notifier.sent.borrow().is_empty());
        assert_eq!(store.load()["BTC/USDT"], Signal::Neutral);

        // Cycle 3: SellClose → notification, state advances.
        let provider = ScriptedProvider::new(&[("BTC/USDT", Some(sell_series()))]);
        let outcome = run_cycle(&provider, &notifier, &store, &config).unwrap();
        assert_eq!(outcome.alerts_sent, 1);
        assert_eq!(store.load()["BTC/USDT"], Signal::SellClose);

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "42");
        assert!(sent[0].1.contains("SELL/CLOSE"));
    }

    #[test]
    fn fetch_failure_skips_symbol_and_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&["BTC/USDT", "ETH/USDT"], dir.path());
        let store = SignalStore::new(&config.watch.state_file);
        let notifier = RecordingNotifier::default();

        let mut seed = HashMap::new();
        seed.insert("BTC/USDT".to_string(), Signal::SellClose);
        store.save(&seed).unwrap();

        // BTC fetch fails; ETH flips to StrongBuy.
        let provider = ScriptedProvider::new(&[
            ("BTC/USDT", None),
            ("ETH/USDT", Some(buy_series())),
        ]);
        let outcome = run_cycle(&provider, &notifier, &store, &config).unwrap();

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.alerts_sent, 1);
        let state = store.load();
        // Untouched despite the outage.
        assert_eq!(state["BTC/USDT"], Signal::SellClose);
        assert_eq!(state["ETH/USDT"], Signal::StrongBuy);
    }

    #[test]
    fn transport_failure_does_not_abort_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&["BTC/USDT", "ETH/USDT"], dir.path());
        let store = SignalStore::new(&config.watch.state_file);
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };

        let provider = ScriptedProvider::new(&[
            ("BTC/USDT", Some(buy_series())),
            ("ETH/USDT", Some(sell_series())),
        ]);
        let outcome = run_cycle(&provider, &notifier, &store, &config).unwrap();

        // Both symbols processed; state advanced despite transport failures.
        assert_eq!(outcome.checked, 2);
        assert_eq!(outcome.alerts_sent, 2);
        let state = store.load();
        assert_eq!(state["BTC/USDT"], Signal::StrongBuy);
        assert_eq!(state["ETH/USDT"], Signal::SellClose);
    }
}
