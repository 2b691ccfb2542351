//! Dashboard state persistence — JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use rsiwatch_core::domain::Timeframe;

use crate::app::AppState;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub oversold: f64,
    pub overbought: f64,
    pub capital: f64,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            timeframe: Timeframe::H1,
            oversold: 30.0,
            overbought: 70.0,
            capital: 1000.0,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        symbol: app.symbol.clone(),
        timeframe: app.timeframe,
        oversold: app.oversold,
        overbought: app.overbought,
        capital: app.capital,
    }
}

/// Apply persisted state to AppState.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.symbol = state.symbol;
    app.timeframe = state.timeframe;
    app.oversold = state.oversold;
    app.overbought = state.overbought;
    app.capital = state.capital;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let dir = std::env::temp_dir().join("rsiwatch_persist_test");
        let path = dir.join("state.json");

        let state = PersistedState {
            symbol: "ETH/USDT".into(),
            timeframe: Timeframe::H4,
            oversold: 25.0,
            overbought: 75.0,
            capital: 5000.0,
        };

        save(&path, &state).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded.symbol, "ETH/USDT");
        assert_eq!(loaded.timeframe, Timeframe::H4);
        assert_eq!(loaded.capital, 5000.0);

        // Cleanup
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let loaded = load(Path::new("/nonexistent/path/state.json"));
        assert_eq!(loaded.symbol, "BTC/USDT");
        assert_eq!(loaded.timeframe, Timeframe::H1);
    }
}
