//! SSH client configuration for the virtual machine.
//!
//! Adds a `Host <hostname>` block to `~/.ssh/config` so `ssh <hostname>`
//! reaches the guest with the generated key. The block is keyed by hostname:
//! re-running replaces it instead of appending a duplicate.

use std::{
    fs, io,
    os::unix::fs::DirBuilderExt,
    path::{Path, PathBuf},
};

use super::constants::{SSH_CONFIG_MODE, SSH_DIR_MODE, SSH_GUEST_USER};
use crate::{config::write_atomic, error::Result};

/// The SSH client settings for one VM hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshHostEntry {
    /// Hostname the block matches.
    pub hostname: String,
    /// Private key used to log in.
    pub identity_file: PathBuf,
}

impl SshHostEntry {
    /// Create an entry for `hostname` using `identity_file`.
    pub fn new(hostname: impl Into<String>, identity_file: impl Into<PathBuf>) -> Self {
        Self { hostname: hostname.into(), identity_file: identity_file.into() }
    }

    /// Render the `Host` block, newline terminated.
    pub fn render(&self) -> String {
        format!(
            "Host {host}\n  HostName {host}\n  User {user}\n  IdentityFile {key}\n  \
             StrictHostKeyChecking no\n  UserKnownHostsFile /dev/null\n  LogLevel ERROR\n",
            host = self.hostname,
            user = SSH_GUEST_USER,
            key = self.identity_file.display(),
        )
    }
}

/// Split a config line into its lowercased keyword and the remaining arguments.
fn keyword(line: &str) -> Option<(String, &str)> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let end = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let rest = line[end..].trim_start_matches(|c: char| c.is_whitespace() || c == '=');
    Some((line[..end].to_lowercase(), rest))
}

/// Return `existing` with the block for `entry.hostname` replaced by `entry`.
///
/// A block starts at a `Host` or `Match` line and runs until the next one.
/// Only a block whose `Host` line names exactly this hostname is replaced;
/// every other line is kept as-is.
pub fn upsert_host_entry(existing: &str, entry: &SshHostEntry) -> String {
    let hostname: Vec<&str> = entry.hostname.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in existing.lines() {
        if let Some((word, args)) = keyword(line)
            && (word == "host" || word == "match")
        {
            let patterns: Vec<&str> = args.split_whitespace().collect();
            skipping = word == "host" && patterns == hostname;
        }
        if !skipping {
            kept.push(line);
        }
    }

    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }

    let mut out = kept.join("\n");
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&entry.render());
    out
}

/// Upsert `entry` into the SSH client config at `ssh_config`.
///
/// Creates the parent directory (mode 0700) and the file (mode 0600) if they
/// do not exist.
pub fn register_host(ssh_config: &Path, entry: &SshHostEntry) -> Result<()> {
    if let Some(dir) = ssh_config.parent()
        && !dir.exists()
    {
        fs::DirBuilder::new().recursive(true).mode(SSH_DIR_MODE).create(dir)?;
    }

    let existing = match fs::read_to_string(ssh_config) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let updated = upsert_host_entry(&existing, entry);
    write_atomic(ssh_config, updated.as_bytes(), SSH_CONFIG_MODE)?;

    tracing::debug!(path = %ssh_config.display(), host = %entry.hostname, "Registered SSH host");
    Ok(())
}
