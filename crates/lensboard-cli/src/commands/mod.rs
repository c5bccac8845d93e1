pub mod cameras;
pub mod live;
pub mod stats;
pub mod theme;

use anyhow::{Context as _, Result};
use lensboard_core::config::Preferences;
use lensboard_infrastructure::PreferenceStore;
use lensboard_interaction::HttpStreamBackend;
use std::path::PathBuf;

/// Preferences and the store they came from, shared by every subcommand.
pub struct Context {
    pub store: PreferenceStore,
    pub preferences: Preferences,
}

impl Context {
    /// Loads preferences and applies command-line overrides.
    pub fn load(config: Option<PathBuf>, base_url: Option<String>) -> Result<Self> {
        let store = match config {
            Some(path) => PreferenceStore::with_path(path),
            None => PreferenceStore::new()?,
        };

        let mut preferences = store
            .load()
            .with_context(|| format!("Failed to load {}", store.path().display()))?;

        if let Some(base_url) = base_url {
            preferences.backend.base_url = base_url;
            preferences.validate().context("Invalid --base-url")?;
        }

        tracing::debug!(
            path = %store.path().display(),
            base_url = %preferences.backend.base_url,
            "Preferences loaded"
        );
        Ok(Self { store, preferences })
    }

    pub fn backend(&self) -> Result<HttpStreamBackend> {
        Ok(HttpStreamBackend::from_preferences(&self.preferences)?)
    }
}
