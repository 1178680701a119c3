//! Execution context shared by commands.

use crate::{config::Settings, error::Result};

/// Context for CLI command execution.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved tool settings.
    pub settings: Settings,
}

impl Context {
    /// Create a context, loading settings from the user's settings file and
    /// environment.
    pub fn new() -> Result<Self> {
        Ok(Self { settings: Settings::load()? })
    }
}
