//! Persisted watchlist: a set of coin ids behind a single JSON file.
//!
//! The store is the only mutation surface for the watchlist; handlers get
//! it from the application state instead of touching the file themselves.
//! Single writer, single reader, so plain read-then-write is enough.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

pub struct WatchlistStore {
    path: PathBuf,
    coins: Vec<String>,
}

impl WatchlistStore {
    /// Load the persisted set; a missing or unreadable file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let coins = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(coins) => coins,
                Err(err) => {
                    warn!("watchlist file {} is malformed: {err}, starting empty", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self { path, coins }
    }

    pub fn coins(&self) -> &[String] {
        &self.coins
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn is_watched(&self, coin_id: &str) -> bool {
        self.coins.iter().any(|id| id == coin_id)
    }

    /// Flip membership for `coin_id`, persist the full set, and return the
    /// new membership state.
    pub fn toggle(&mut self, coin_id: &str) -> Result<bool> {
        let watched = if self.is_watched(coin_id) {
            self.coins.retain(|id| id != coin_id);
            false
        } else {
            self.coins.push(coin_id.to_string());
            true
        };

        self.persist()?;
        Ok(watched)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating watchlist dir {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string(&self.coins)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing watchlist to {}", self.path.display()))?;
        Ok(())
    }
}
