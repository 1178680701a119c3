//! Provisioning steps run by `dlite init`.
//!
//! Each step is a plain function over explicit inputs so it can be tested on
//! its own; [`provisioning_steps`] wires them into runner order.

use std::{
    fs,
    io::Write,
    os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt},
    path::Path,
};

use super::{
    assets::AssetStore,
    constants::{
        DIR_MODE, EXECUTABLE_MODE, HELPER_TOOLS, QCOW_TOOL, SSH_KEY_BITS, SSH_KEYGEN, STEP_DISK,
        STEP_DOWNLOAD, STEP_SAVE_CONFIG, STEP_SSH_CONFIG, STEP_SSH_KEYS, STEP_TOOLS,
    },
    download::Downloader,
    identity::{InstallPaths, InstallationIdentity},
    process::CommandRunner,
    runner::Step,
    ssh::{SshHostEntry, register_host},
};
use crate::{
    config::{Config, write_config},
    error::{Error, Result},
};

/// External collaborators the steps call into.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Source of helper tool binaries.
    pub assets: &'a dyn AssetStore,
    /// Runs `ssh-keygen`, `qcow-tool`, and the privileged setup.
    pub runner: &'a dyn CommandRunner,
    /// Fetches the guest OS.
    pub downloader: &'a dyn Downloader,
}

/// Build the provisioning steps in execution order.
pub fn provisioning_steps<'a>(
    identity: &'a InstallationIdentity,
    paths: &'a InstallPaths,
    config: &'a Config,
    collab: Collaborators<'a>,
) -> Vec<Step<'a>> {
    vec![
        Step::new(STEP_SAVE_CONFIG, move || persist_config(paths, config)),
        Step::new(STEP_SSH_KEYS, move || generate_ssh_keys(collab.runner, identity, paths)),
        Step::new(STEP_SSH_CONFIG, move || register_ssh_host(paths, &config.hostname)),
        Step::new(STEP_TOOLS, move || stage_helpers(collab.assets, &paths.bin_dir, HELPER_TOOLS)),
        Step::new(STEP_DISK, move || create_disk(collab.runner, identity, paths, config.disk)),
        Step::new(STEP_DOWNLOAD, move || download_os(collab.downloader, paths)),
    ]
}

/// Write the configuration to the install's config file.
pub fn persist_config(paths: &InstallPaths, config: &Config) -> Result<()> {
    write_config(&paths.config_file, config)
}

/// Generate the SSH key pair used to log in to the guest.
pub fn generate_ssh_keys(
    runner: &dyn CommandRunner,
    identity: &InstallationIdentity,
    paths: &InstallPaths,
) -> Result<()> {
    let args = [
        "-q".to_string(),
        "-t".to_string(),
        "rsa".to_string(),
        "-b".to_string(),
        SSH_KEY_BITS.to_string(),
        "-N".to_string(),
        String::new(),
        "-C".to_string(),
        format!("{}@dlite", identity.name),
        "-f".to_string(),
        paths.ssh_key.to_string_lossy().to_string(),
    ];
    runner.run(SSH_KEYGEN, &args)?;
    Ok(())
}

/// Point `ssh <hostname>` at the guest using the generated key.
pub fn register_ssh_host(paths: &InstallPaths, hostname: &str) -> Result<()> {
    register_host(&paths.ssh_config, &SshHostEntry::new(hostname, &paths.ssh_key))
}

/// Write each helper tool from `assets` into `bin_dir` as an executable.
///
/// Stops at the first missing asset; tools after it are not written.
pub fn stage_helpers(assets: &dyn AssetStore, bin_dir: &Path, tools: &[&str]) -> Result<()> {
    fs::DirBuilder::new().recursive(true).mode(DIR_MODE).create(bin_dir)?;

    for tool in tools {
        let payload = assets.get(tool)?;
        let path = bin_dir.join(tool);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(EXECUTABLE_MODE)
            .open(&path)?;
        file.write_all(&payload)?;
        file.sync_all()?;
        fs::set_permissions(&path, fs::Permissions::from_mode(EXECUTABLE_MODE))?;

        tracing::debug!(tool, bytes = payload.len(), "Staged helper tool");
    }

    Ok(())
}

/// Create the VM's backing disk with the staged `qcow-tool`.
pub fn create_disk(
    runner: &dyn CommandRunner,
    identity: &InstallationIdentity,
    paths: &InstallPaths,
    size_gb: u32,
) -> Result<()> {
    if size_gb == 0 {
        return Err(Error::config("Disk size must be at least 1 gigabyte"));
    }

    let tool = paths.tool(QCOW_TOOL);
    let args = [
        "create".to_string(),
        format!("--size={size_gb}GiB"),
        paths.disk_file.to_string_lossy().to_string(),
    ];
    runner.run(&tool.to_string_lossy(), &args)?;

    let image = fs::metadata(&paths.disk_file).map_err(|e| {
        Error::other(format!("{QCOW_TOOL} did not create {}: {e}", paths.disk_file.display()))
    })?;
    if image.len() == 0 {
        return Err(Error::other(format!(
            "{QCOW_TOOL} created an empty image at {}",
            paths.disk_file.display()
        )));
    }

    std::os::unix::fs::chown(&paths.disk_file, Some(identity.uid), Some(identity.gid))?;
    Ok(())
}

/// Download the guest OS into the config directory.
pub fn download_os(downloader: &dyn Downloader, paths: &InstallPaths) -> Result<()> {
    let files = downloader.download(&paths.config_dir)?;
    tracing::debug!(?files, "Downloaded guest OS");
    Ok(())
}
