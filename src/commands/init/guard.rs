//! Existing-installation guard.
//!
//! Re-running init destroys the current virtual machine, so an existing
//! install must be confirmed before the config directory is reset.

use std::{
    fs, io,
    os::unix::fs::{DirBuilderExt, PermissionsExt},
    path::Path,
};

use super::{constants::DIR_MODE, identity::InstallPaths};
use crate::{
    config::{Config, read_config},
    error::{Error, Result},
    tui::Prompt,
};

/// What the guard found at the config path.
#[derive(Debug)]
pub enum Installation {
    /// No config file.
    Fresh,
    /// A readable config file.
    Existing(Box<Config>),
    /// A config file that exists but could not be read or parsed.
    Unreadable(Error),
}

impl Installation {
    /// Whether continuing would destroy something.
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// Inspect the persisted configuration at `config_file`.
pub fn detect(config_file: &Path) -> Installation {
    match read_config(config_file) {
        Ok(None) => Installation::Fresh,
        Ok(Some(config)) => Installation::Existing(Box::new(config)),
        Err(e) => Installation::Unreadable(e),
    }
}

/// Confirm destruction of an existing install, then reset the config directory.
///
/// Declining leaves the filesystem untouched and returns
/// [`Error::Cancelled`].
pub fn guard(paths: &InstallPaths, prompt: &mut dyn Prompt) -> Result<()> {
    let installation = detect(&paths.config_file);

    match &installation {
        Installation::Fresh => {
            tracing::debug!(dir = %paths.config_dir.display(), "No existing installation");
        },
        Installation::Existing(config) => {
            tracing::info!(id = %config.id, hostname = %config.hostname, "Found existing installation");
        },
        Installation::Unreadable(e) => {
            tracing::warn!(error = %e, "Existing configuration could not be read");
            teapot::output::warning(&e.to_string());
        },
    }

    if installation.exists() {
        teapot::output::warning(
            "It appears you have already initialized dlite. Continuing will destroy your \
             current virtual machine and its configuration.",
        );
        if !prompt.confirm("Continue?")? {
            return Err(Error::cancelled("Aborting initialization..."));
        }
    }

    reset_config_dir(&paths.config_dir)
}

/// Remove `dir` recursively if it exists, then recreate it empty.
pub fn reset_config_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "Removed config directory"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => {
            return Err(Error::other(format!("Failed to remove {}: {}", dir.display(), e)));
        },
    }

    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .and_then(|()| fs::set_permissions(dir, fs::Permissions::from_mode(DIR_MODE)))
        .map_err(|e| Error::other(format!("Failed to create {}: {}", dir.display(), e)))
}
