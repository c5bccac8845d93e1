//! Path resolution for Lensboard's local files.
//!
//! ```text
//! ~/.config/lensboard/         # dirs::config_dir() on Linux
//! └── config.toml              # Preferences (theme, backend, polling)
//! ```

use lensboard_core::{LensError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "lensboard";
const CONFIG_FILE: &str = "config.toml";

pub struct LensboardPaths;

impl LensboardPaths {
    /// Returns the Lensboard configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| LensError::config("Cannot find config directory"))
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
