//! Persisted signal state — symbol → last-dispatched signal.
//!
//! Flat JSON file, read fully at cycle start and written fully at cycle
//! end. The write goes through a temp file and rename so a crash mid-write
//! never leaves a truncated state file. Single-process use only; there is
//! no locking against concurrent writers.

use rsiwatch_core::domain::Signal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle on the signal-state file.
pub struct SignalStore {
    path: PathBuf,
}

impl SignalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full state map. A missing file is a fresh start; a corrupt
    /// file is logged and reset rather than aborting the run.
    pub fn load(&self) -> HashMap<String, Signal> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!(
                        "state file {} is corrupt ({e}), resetting",
                        self.path.display()
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    /// Write the full state map atomically (temp file + rename).
    pub fn save(&self, state: &HashMap<String, Signal>) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;

        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsiwatch_core::domain::Signal;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("last_signals.json"));

        let mut state = HashMap::new();
        state.insert("BTC/USDT".to_string(), Signal::StrongBuy);
        state.insert("ETH/USDT".to_string(), Signal::Neutral);

        store.save(&state).unwrap();
        let loaded = store.load();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["BTC/USDT"], Signal::StrongBuy);
        assert_eq!(loaded["ETH/USDT"], Signal::Neutral);
    }

    #[test]
    fn file_uses_signal_wire_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("last_signals.json"));

        let mut state = HashMap::new();
        state.insert("SOL/USDT".to_string(), Signal::SellClose);
        store.save(&state).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"SELL_CLOSE\""));
    }

    #[test]
    fn missing_file_is_fresh_start() {
        let store = SignalStore::new("/nonexistent/path/last_signals.json");
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_signals.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SignalStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("nested/state/last_signals.json"));
        store.save(&HashMap::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("last_signals.json"));
        store.save(&HashMap::new()).unwrap();
        assert!(!dir.path().join("last_signals.json.tmp").exists());
    }
}
