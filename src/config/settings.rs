//! Tool settings.
//!
//! Settings control where dlite fetches the guest OS from, which program
//! performs the privileged setup, and where helper binaries come from.
//!
//! Resolution order (highest to lowest):
//! 1. Environment variables (`DLITE_*`)
//! 2. User settings file (`~/.config/dlite/settings.yaml`)
//! 3. Defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Release manifest for the guest operating system.
pub const DEFAULT_OS_RELEASE_URL: &str = "https://api.github.com/repos/nlf/dhyve-os/releases/latest";

/// Program run under `sudo` once provisioning succeeds.
pub const DEFAULT_SETUP_PROGRAM: &str = "dlite-setup";

/// dlite tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// URL of the guest OS release manifest.
    #[serde(default = "default_os_release_url")]
    pub os_release_url: String,

    /// Privileged setup program.
    #[serde(default = "default_setup_program")]
    pub setup_program: String,

    /// Load helper binaries from this directory instead of the embedded set.
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,
}

fn default_os_release_url() -> String {
    DEFAULT_OS_RELEASE_URL.to_string()
}

fn default_setup_program() -> String {
    DEFAULT_SETUP_PROGRAM.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            os_release_url: default_os_release_url(),
            setup_program: default_setup_program(),
            asset_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from all sources with proper precedence.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::user_settings_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };

        settings.apply_overrides(|key| std::env::var(key).ok());

        tracing::debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Load settings from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read settings file {}: {}", path.display(), e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            Error::config(format!("Failed to parse settings file {}: {}", path.display(), e))
        })
    }

    /// Apply `DLITE_*` overrides using the given variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = lookup("DLITE_OS_RELEASE_URL") {
            self.os_release_url = url;
        }
        if let Some(program) = lookup("DLITE_SETUP_PROGRAM") {
            self.setup_program = program;
        }
        if let Some(dir) = lookup("DLITE_ASSET_DIR") {
            self.asset_dir = Some(PathBuf::from(dir));
        }
    }

    /// Get the path to the user settings file.
    #[must_use]
    pub fn user_settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.yaml"))
    }

    /// Get the path to the user config directory.
    ///
    /// Uses `$XDG_CONFIG_HOME/dlite` if set, otherwise `~/.config/dlite`.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join("dlite"));
        }

        dirs::home_dir().map(|p| p.join(".config").join("dlite"))
    }
}
