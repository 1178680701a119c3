//! Configuration for dlite.
//!
//! Two kinds of configuration live here:
//! - [`Config`]: the per-install virtual machine record, persisted as
//!   `~/.dlite/config.yaml` by `dlite init`
//! - [`Settings`]: tool settings that control where dlite fetches things
//!   from, loaded from `~/.config/dlite/settings.yaml` and `DLITE_*`
//!   environment variables

mod settings;

use std::{
    fs,
    io::{self, Write},
    os::unix::fs::PermissionsExt,
    path::Path,
};

use serde::{Deserialize, Serialize};
pub use settings::Settings;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default virtual machine hostname.
pub const DEFAULT_HOSTNAME: &str = "local.docker";

/// Default disk size in gigabytes.
pub const DEFAULT_DISK_GB: u32 = 20;

/// Default number of CPU cores.
pub const DEFAULT_CPU: u32 = 2;

/// Default memory in gigabytes.
pub const DEFAULT_MEMORY_GB: u32 = 2;

/// Default Docker version inside the guest.
pub const DEFAULT_DOCKER_VERSION: &str = "latest";

/// The virtual machine configuration for one install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Identity token, generated once per install.
    pub id: Uuid,

    /// Virtual machine hostname.
    pub hostname: String,

    /// Disk size in gigabytes.
    pub disk: u32,

    /// CPU cores allocated to the VM.
    pub cpu: u32,

    /// Memory allocated to the VM in gigabytes.
    pub memory: u32,

    /// DNS server handed to the guest.
    #[serde(default)]
    pub dns: String,

    /// Docker version to run in the guest.
    pub docker: String,

    /// Extra flags passed to the docker daemon.
    #[serde(default)]
    pub extra: String,

    /// Allow direct connections from the host to containers.
    pub route: bool,
}

impl Config {
    /// Create a configuration with default values and a fresh identity token.
    pub fn with_defaults(dns: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            disk: DEFAULT_DISK_GB,
            cpu: DEFAULT_CPU,
            memory: DEFAULT_MEMORY_GB,
            dns: dns.into(),
            docker: DEFAULT_DOCKER_VERSION.to_string(),
            extra: String::new(),
            route: true,
        }
    }
}

/// Read a persisted configuration.
///
/// Returns `Ok(None)` when the file does not exist, which means there is no
/// existing installation. A file that exists but cannot be read or parsed is
/// an error.
pub fn read_config(path: &Path) -> Result<Option<Config>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )));
        },
    };

    serde_yaml::from_str(&contents).map(Some).map_err(|e| {
        Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Write a configuration to `path`, replacing any existing file atomically.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let contents = serde_yaml::to_string(config)?;
    write_atomic(path, contents.as_bytes(), 0o644)
}

/// Write `contents` to `path` via a temporary file in the same directory.
///
/// The temporary file is renamed over `path` only after it has been fully
/// written and synced, so readers see either the old or the new file.
pub fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
