//! Current user identity and the install paths derived from it.
//!
//! Both are computed fresh on every run and passed explicitly to each
//! provisioning step.

use std::path::{Path, PathBuf};

use super::constants::{
    BIN_DIR_NAME, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DISK_FILE_NAME, SSH_KEY_NAME,
};
use crate::error::{Error, Result};

/// The user dlite is being installed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationIdentity {
    /// Login name.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Numeric primary group id.
    pub gid: u32,
    /// Home directory.
    pub home: PathBuf,
}

impl InstallationIdentity {
    /// Create an identity from explicit values.
    pub fn new(name: impl Into<String>, uid: u32, gid: u32, home: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), uid, gid, home: home.into() }
    }

    /// Resolve the identity of the user running this process.
    pub fn current() -> Result<Self> {
        let (uid, gid) = current_ids();
        let home = dirs::home_dir()
            .filter(|h| !h.as_os_str().is_empty())
            .ok_or_else(|| Error::identity("home directory is not set"))?;

        let name = ["USER", "LOGNAME"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| uid.to_string());

        Ok(Self::new(name, uid, gid, home))
    }
}

#[allow(unsafe_code)]
fn current_ids() -> (u32, u32) {
    // SAFETY: getuid and getgid always succeed and take no arguments.
    unsafe { (libc::getuid(), libc::getgid()) }
}

/// Filesystem layout of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Root configuration directory (`~/.dlite`).
    pub config_dir: PathBuf,
    /// Helper binaries (`~/.dlite/bin`).
    pub bin_dir: PathBuf,
    /// Persisted configuration (`~/.dlite/config.yaml`).
    pub config_file: PathBuf,
    /// VM backing disk (`~/.dlite/disk.qcow`).
    pub disk_file: PathBuf,
    /// SSH private key (`~/.dlite/key`); the public key sits next to it.
    pub ssh_key: PathBuf,
    /// The user's SSH client configuration (`~/.ssh/config`).
    pub ssh_config: PathBuf,
}

impl InstallPaths {
    /// Derive the install layout for `identity`.
    pub fn for_identity(identity: &InstallationIdentity) -> Self {
        Self::under_home(&identity.home)
    }

    fn under_home(home: &Path) -> Self {
        let config_dir = home.join(CONFIG_DIR_NAME);
        Self {
            bin_dir: config_dir.join(BIN_DIR_NAME),
            config_file: config_dir.join(CONFIG_FILE_NAME),
            disk_file: config_dir.join(DISK_FILE_NAME),
            ssh_key: config_dir.join(SSH_KEY_NAME),
            ssh_config: home.join(".ssh").join("config"),
            config_dir,
        }
    }

    /// Path of a staged helper tool.
    pub fn tool(&self, name: &str) -> PathBuf {
        self.bin_dir.join(name)
    }

    /// Path of the SSH public key.
    pub fn ssh_public_key(&self) -> PathBuf {
        self.ssh_key.with_extension("pub")
    }
}
