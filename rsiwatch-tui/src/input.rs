//! Keyboard input dispatch — global keys first, then panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, ConfigField, Panel};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Global keys. While the symbol field is being edited, printable
    //    characters belong to the field, so globals shrink to the essentials.
    let editing_symbol =
        app.active_panel == Panel::Config && app.selected_field == ConfigField::Symbol;

    match key.code {
        KeyCode::Char('q') if !editing_symbol => {
            app.running = false;
            return;
        }
        KeyCode::Char('r') if !editing_symbol => {
            app.request_analysis();
            return;
        }
        KeyCode::Char(c @ '1'..='5') if !editing_symbol => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Esc => {
            app.running = false;
            return;
        }
        _ => {}
    }

    // 2. Panel-specific keys.
    match app.active_panel {
        Panel::Config => handle_config_key(app, key),
        // Display-only panels.
        Panel::Signal | Panel::Chart | Panel::Trades | Panel::Help => {}
    }
}

fn handle_config_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.selected_field = app.selected_field.prev(),
        KeyCode::Down => app.selected_field = app.selected_field.next(),
        KeyCode::Left => app.adjust_selected(false),
        KeyCode::Right => app.adjust_selected(true),
        KeyCode::Enter => app.request_analysis(),
        KeyCode::Backspace if app.selected_field == ConfigField::Symbol => {
            app.symbol.pop();
        }
        KeyCode::Char(c) if app.selected_field == ConfigField::Symbol => {
            if c.is_ascii_alphanumeric() || c == '/' {
                app.symbol.push(c.to_ascii_uppercase());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerResponse;
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn test_app() -> AppState {
        let (tx, keep_rx) = mpsc::channel();
        let (keep_tx, rx) = mpsc::channel::<WorkerResponse>();
        std::mem::forget(keep_rx);
        std::mem::forget(keep_tx);
        AppState::new(tx, rx, PathBuf::from("/tmp/rsiwatch-input-test.json"))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits_outside_symbol_editing() {
        let mut app = test_app();
        app.active_panel = Panel::Signal;
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn typing_into_symbol_field_does_not_quit() {
        let mut app = test_app();
        app.active_panel = Panel::Config;
        app.selected_field = ConfigField::Symbol;
        app.symbol.clear();

        for c in "qbtc/usdt".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        assert!(app.running);
        assert_eq!(app.symbol, "QBTC/USDT");
    }

    #[test]
    fn symbol_input_rejects_punctuation() {
        let mut app = test_app();
        app.selected_field = ConfigField::Symbol;
        app.symbol.clear();
        for c in "btc.!? usdt".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.symbol, "BTCUSDT");
    }

    #[test]
    fn tab_cycles_panels() {
        let mut app = test_app();
        let start = app.active_panel;
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, start.next());
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, start);
    }

    #[test]
    fn digits_jump_to_panel() {
        let mut app = test_app();
        app.active_panel = Panel::Signal;
        handle_key(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.active_panel, Panel::Trades);
    }

    #[test]
    fn arrows_move_field_selection() {
        let mut app = test_app();
        app.active_panel = Panel::Config;
        let start = app.selected_field;
        handle_key(&mut app, press(KeyCode::Down));
        assert_eq!(app.selected_field, start.next());
        handle_key(&mut app, press(KeyCode::Up));
        assert_eq!(app.selected_field, start);
    }

    #[test]
    fn enter_triggers_analysis() {
        let mut app = test_app();
        app.active_panel = Panel::Config;
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.analysis_in_progress);
    }
}
