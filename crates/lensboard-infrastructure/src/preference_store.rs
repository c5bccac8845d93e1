//! Preference store implementation.
//!
//! Loads and saves [`Preferences`] from `~/.config/lensboard/config.toml`.

use crate::paths::LensboardPaths;
use crate::storage::TomlFile;
use lensboard_core::Result;
use lensboard_core::config::{Preferences, ThemeMode};
use std::path::{Path, PathBuf};

/// File-backed preference store.
///
/// Nothing is cached: every read goes to disk, so several processes sharing
/// the file always see the latest write.
pub struct PreferenceStore {
    file: TomlFile<Preferences>,
}

impl PreferenceStore {
    /// Creates a store for the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(LensboardPaths::config_file()?))
    }

    /// Creates a store for an explicit file path (tests, `--config`).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: TomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads preferences, falling back to defaults when the file is absent or
    /// empty. The loaded values are validated.
    pub fn load(&self) -> Result<Preferences> {
        let preferences = self.file.load()?.unwrap_or_default();
        preferences.validate()?;
        Ok(preferences)
    }

    /// Validates and writes the full preference set.
    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        preferences.validate()?;
        self.file.save(preferences)?;
        tracing::debug!(path = ?self.path(), "Preferences saved");
        Ok(())
    }

    pub fn theme(&self) -> Result<ThemeMode> {
        Ok(self.load()?.theme)
    }

    pub fn set_theme(&self, theme: ThemeMode) -> Result<ThemeMode> {
        self.modify(|preferences| preferences.theme = theme)
            .map(|preferences| preferences.theme)
    }

    /// Flips between light and dark and returns the new mode.
    pub fn toggle_theme(&self) -> Result<ThemeMode> {
        self.modify(|preferences| preferences.theme = preferences.theme.toggled())
            .map(|preferences| preferences.theme)
    }

    /// Applies `f` under the file lock and persists the result.
    pub fn modify<F>(&self, f: F) -> Result<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        self.file.update(Preferences::default(), |preferences| {
            f(preferences);
            preferences.validate()
        })
    }
}
