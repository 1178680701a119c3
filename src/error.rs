//! Error types for dlite.
//!
//! Every failure during provisioning is fatal and surfaced immediately; this
//! module maps each kind of failure to the process exit code.

use std::io;

use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (unreadable settings, invalid config record).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The current user or home directory could not be resolved.
    #[error("Could not resolve the current user: {0}")]
    Identity(String),

    /// A helper tool was requested that the asset store does not contain.
    #[error("Asset '{0}' is not bundled with this build of dlite")]
    AssetMissing(String),

    /// An external program exited unsuccessfully.
    #[error("{program} failed: {message}")]
    Subprocess {
        /// Program that was executed.
        program: String,
        /// Exit code, if the program was not terminated by a signal.
        code: Option<i32>,
        /// Captured stderr, verbatim.
        message: String,
    },

    /// Guest OS download failed for a reason other than transport.
    #[error("Download failed: {0}")]
    Download(String),

    /// A provisioning step failed.
    #[error("{step}: {source}")]
    Step {
        /// Label of the step that failed.
        step: String,
        /// Exit code the process ends with.
        exit_code: i32,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// HTTP transport error.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (file operations, process spawning).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// User declined or aborted an operation.
    #[error("{0}")]
    Cancelled(String),

    /// General/unspecified error.
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the exit code for this error type.
    ///
    /// Every failure exits with 1, except a failing subprocess whose own exit
    /// code is carried through so callers can tell what went wrong.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Subprocess { code: Some(code), .. } if (1..=255).contains(code) => *code,
            Self::Step { exit_code, .. } => *exit_code,
            _ => 1,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an identity error.
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Create a download error.
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Create a cancellation error.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a general error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
