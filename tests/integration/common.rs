//! Common test utilities.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway home directory for running `dlite` against.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    /// Create an empty home directory.
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("Failed to create temp dir") }
    }

    /// Home directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The install's config directory (`~/.dlite`).
    pub fn config_dir(&self) -> PathBuf {
        self.path().join(".dlite")
    }

    /// The install's config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.yaml")
    }

    /// Write `contents` to `~/.dlite/<name>`, creating the directory.
    pub fn write_install_file(&self, name: &str, contents: &[u8]) {
        fs::create_dir_all(self.config_dir()).expect("Failed to create config dir");
        fs::write(self.config_dir().join(name), contents).expect("Failed to write install file");
    }

    /// Write the tool settings file under this home's XDG config dir.
    pub fn write_settings(&self, contents: &str) {
        let dir = self.path().join(".config").join("dlite");
        fs::create_dir_all(&dir).expect("Failed to create settings dir");
        fs::write(dir.join("settings.yaml"), contents).expect("Failed to write settings");
    }

    /// A `dlite` command isolated to this home.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dlite"));
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("USER", "tester")
            .env_remove("DLITE_DEBUG")
            .env_remove("DLITE_OS_RELEASE_URL")
            .env_remove("DLITE_SETUP_PROGRAM")
            .env_remove("DLITE_ASSET_DIR");
        cmd
    }
}

/// A persisted config record as `dlite init` writes it.
pub const EXISTING_CONFIG: &str = "\
id: 0190a6f2-6b7c-7d1e-8f00-1234567890ab
hostname: local.docker
disk: 20
cpu: 2
memory: 2
dns: 192.168.1.1
docker: latest
extra: ''
route: true
";
