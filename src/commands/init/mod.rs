//! `dlite init`: provision a local virtual machine for Docker.
//!
//! Resolves the installing user, guards an existing install, collects a new
//! configuration, runs the provisioning steps in order and finally hands off
//! to the privileged setup program under `sudo`.
//!
//! Every stage talks to the outside world through a trait
//! ([`Prompt`](crate::tui::Prompt), [`AssetStore`](assets::AssetStore),
//! [`CommandRunner`](process::CommandRunner), [`Downloader`](download::Downloader),
//! [`StepReporter`](runner::StepReporter)); [`run_init`] wires in the real
//! implementations.

pub mod assets;
pub mod builder;
pub mod constants;
pub mod download;
pub mod guard;
pub mod handoff;
pub mod identity;
pub mod output;
pub mod process;
pub mod runner;
pub mod ssh;
pub mod steps;

use self::{
    assets::asset_store,
    builder::{build_config, host_address},
    constants::OS_ASSETS,
    download::ReleaseDownloader,
    guard::guard,
    handoff::handoff,
    identity::{InstallPaths, InstallationIdentity},
    process::SystemRunner,
    runner::{SpinnerReporter, StepReporter, run_steps},
    steps::provisioning_steps,
};
pub use self::steps::Collaborators;
use crate::{
    config::{Config, Settings},
    context::Context,
    error::{Error, Result},
    tui::{FormPrompt, LinePrompt, Prompt, StdioPrompt, use_forms},
};

/// Notice printed before control passes to `sudo`.
const SUDO_NOTICE: &str =
    "Next we'll run a few steps that require sudo, you may be prompted for your password.";

/// Run `dlite init`.
///
/// The whole pipeline blocks on stdin, subprocesses, and the network, so it
/// runs on the blocking thread pool.
pub async fn init(ctx: &Context) -> Result<()> {
    let settings = ctx.settings.clone();
    tokio::task::spawn_blocking(move || run_init(&settings))
        .await
        .map_err(|e| Error::other(format!("Initialization task failed: {e}")))?
}

/// Provision an install for the current user and hand off to setup.
pub fn run_init(settings: &Settings) -> Result<()> {
    let identity = InstallationIdentity::current()?;
    let paths = InstallPaths::for_identity(&identity);
    tracing::info!(
        user = %identity.name,
        dir = %paths.config_dir.display(),
        "Initializing dlite"
    );

    let assets = asset_store(settings.asset_dir.as_deref());
    let runner = SystemRunner;
    let downloader = ReleaseDownloader::new(&settings.os_release_url, OS_ASSETS)?;
    let collab =
        Collaborators { assets: assets.as_ref(), runner: &runner, downloader: &downloader };

    let mut prompt: Box<dyn Prompt> = if use_forms() {
        Box::new(FormPrompt::new("Configure the dlite virtual machine", StdioPrompt))
    } else {
        Box::new(LinePrompt::stdio())
    };
    let mut reporter = SpinnerReporter::new();

    provision_and_handoff(
        &identity,
        &paths,
        prompt.as_mut(),
        collab,
        &mut reporter,
        &host_address(),
        &settings.setup_program,
    )
}

/// Provision, then run `setup_program` under `sudo` for the new hostname.
///
/// The setup program never runs when provisioning fails.
pub fn provision_and_handoff(
    identity: &InstallationIdentity,
    paths: &InstallPaths,
    prompt: &mut dyn Prompt,
    collab: Collaborators<'_>,
    reporter: &mut dyn StepReporter,
    host_address: &str,
    setup_program: &str,
) -> Result<()> {
    let config = provision(identity, paths, prompt, collab, reporter, host_address)?;

    teapot::output::info(SUDO_NOTICE);
    handoff(collab.runner, setup_program, &config.hostname, &identity.home)
}

/// Guard, configure, and run every provisioning step.
///
/// Returns the configuration that was persisted. Stops at the first failure,
/// leaving completed steps in place.
pub fn provision(
    identity: &InstallationIdentity,
    paths: &InstallPaths,
    prompt: &mut dyn Prompt,
    collab: Collaborators<'_>,
    reporter: &mut dyn StepReporter,
    host_address: &str,
) -> Result<Config> {
    guard(paths, prompt)?;

    let config = build_config(prompt, host_address)?;
    run_steps(provisioning_steps(identity, paths, &config, collab), reporter).into_result()?;

    tracing::info!(id = %config.id, hostname = %config.hostname, "Provisioning complete");
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{
        fs,
        io::Cursor,
        os::unix::fs::{MetadataExt, PermissionsExt},
    };

    use tempfile::TempDir;

    use super::{
        assets::tests::FakeAssets,
        constants::{
            HELPER_TOOLS, HYPERKIT_TOOL, STEP_DISK, STEP_DOWNLOAD, STEP_SAVE_CONFIG,
            STEP_SSH_CONFIG, STEP_SSH_KEYS, STEP_TOOLS,
        },
        download::tests::FakeDownloader,
        process::tests::FakeRunner,
        runner::tests::RecordingReporter,
        *,
    };
    use crate::config::{read_config, write_config};

    /// Eight empty answers: every builder question takes its default.
    const DEFAULTS: &str = "\n\n\n\n\n\n\n\n";

    struct Harness {
        _home: TempDir,
        identity: InstallationIdentity,
        paths: InstallPaths,
        assets: FakeAssets,
        runner: FakeRunner,
        downloader: FakeDownloader,
        reporter: RecordingReporter,
    }

    impl Harness {
        fn new() -> Self {
            let home = TempDir::new().unwrap();
            let meta = fs::metadata(home.path()).unwrap();
            let identity = InstallationIdentity::new("alice", meta.uid(), meta.gid(), home.path());
            let paths = InstallPaths::for_identity(&identity);
            Self {
                _home: home,
                identity,
                paths,
                assets: FakeAssets::with(HELPER_TOOLS),
                runner: FakeRunner::default(),
                downloader: FakeDownloader::default(),
                reporter: RecordingReporter::default(),
            }
        }

        fn provision(&mut self, input: &str) -> Result<Config> {
            let mut prompt = LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
            let collab = Collaborators {
                assets: &self.assets,
                runner: &self.runner,
                downloader: &self.downloader,
            };
            provision(
                &self.identity,
                &self.paths,
                &mut prompt,
                collab,
                &mut self.reporter,
                "10.0.0.2",
            )
        }

        fn provision_and_handoff(&mut self, input: &str) -> Result<()> {
            let mut prompt = LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
            let collab = Collaborators {
                assets: &self.assets,
                runner: &self.runner,
                downloader: &self.downloader,
            };
            provision_and_handoff(
                &self.identity,
                &self.paths,
                &mut prompt,
                collab,
                &mut self.reporter,
                "10.0.0.2",
                "/usr/local/bin/dlite-setup",
            )
        }

        fn started(&self) -> Vec<&str> {
            self.reporter.events.iter().filter_map(|e| e.strip_prefix("start ")).collect()
        }
    }

    #[test]
    fn test_fresh_install_runs_every_step() {
        let mut h = Harness::new();

        let config = h.provision(DEFAULTS).unwrap();

        assert_eq!(
            h.started(),
            vec![
                STEP_SAVE_CONFIG,
                STEP_SSH_KEYS,
                STEP_SSH_CONFIG,
                STEP_TOOLS,
                STEP_DISK,
                STEP_DOWNLOAD
            ]
        );
        assert!(h.reporter.events.iter().all(|e| !e.starts_with("fail")));

        assert_eq!(config.hostname, "local.docker");
        assert_eq!(config.disk, 20);
        assert_eq!(config.dns, "10.0.0.2");
        assert!(config.route);
        assert_eq!(read_config(&h.paths.config_file).unwrap(), Some(config));

        assert!(h.paths.ssh_key.exists());
        assert!(h.paths.ssh_public_key().exists());
        assert!(h.paths.disk_file.exists());
        assert!(h.paths.config_dir.join("bzImage").exists());
        assert!(h.paths.config_dir.join("rootfs.cpio.xz").exists());
        for tool in HELPER_TOOLS {
            let mode = fs::metadata(h.paths.tool(tool)).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        let ssh_config = fs::read_to_string(&h.paths.ssh_config).unwrap();
        assert!(ssh_config.contains("Host local.docker\n"));

        assert_eq!(h.runner.programs(), vec!["ssh-keygen", "qcow-tool"]);
        assert_eq!(*h.downloader.calls.borrow(), vec![h.paths.config_dir.clone()]);
    }

    #[test]
    fn test_declined_existing_install_changes_nothing() {
        let mut h = Harness::new();
        fs::create_dir_all(&h.paths.config_dir).unwrap();
        let existing = Config::with_defaults("1.1.1.1");
        write_config(&h.paths.config_file, &existing).unwrap();
        fs::write(&h.paths.disk_file, b"old disk").unwrap();

        let err = h.provision("n\n").unwrap_err();

        assert!(matches!(err, Error::Cancelled(ref msg) if msg == "Aborting initialization..."));
        assert_eq!(err.exit_code(), 1);
        assert!(h.reporter.events.is_empty());
        assert!(h.runner.calls.borrow().is_empty());
        assert_eq!(read_config(&h.paths.config_file).unwrap(), Some(existing));
        assert_eq!(fs::read(&h.paths.disk_file).unwrap(), b"old disk");
    }

    #[test]
    fn test_reinit_replaces_install_with_new_identity() {
        let mut h = Harness::new();
        fs::create_dir_all(&h.paths.config_dir).unwrap();
        let existing = Config::with_defaults("1.1.1.1");
        write_config(&h.paths.config_file, &existing).unwrap();
        fs::write(h.paths.config_dir.join("stale"), b"x").unwrap();

        let config = h.provision(&format!("y\nvm.local\n{}", &DEFAULTS[1..])).unwrap();

        assert_ne!(config.id, existing.id);
        assert_eq!(config.hostname, "vm.local");
        assert!(!h.paths.config_dir.join("stale").exists());
        assert_eq!(read_config(&h.paths.config_file).unwrap(), Some(config));
    }

    #[test]
    fn test_input_closed_while_configuring() {
        let mut h = Harness::new();

        let err = h.provision("vm.local\n30\n").unwrap_err();

        assert!(matches!(err, Error::Cancelled(_)));
        assert!(h.reporter.events.is_empty());
        assert!(!h.paths.config_file.exists());
    }

    #[test]
    fn test_persist_failure_stops_later_steps() {
        let h = Harness::new();
        fs::create_dir_all(&h.paths.config_file).unwrap();
        let config = Config::with_defaults("");
        let collab =
            Collaborators { assets: &h.assets, runner: &h.runner, downloader: &h.downloader };

        let mut reporter = RecordingReporter::default();
        let outcome =
            run_steps(provisioning_steps(&h.identity, &h.paths, &config, collab), &mut reporter);

        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(reporter.events.len(), 2);
        assert!(reporter.events[1].starts_with(&format!("fail {STEP_SAVE_CONFIG}")));
        assert!(h.runner.calls.borrow().is_empty());
        assert!(!h.paths.bin_dir.exists());
        assert!(!h.paths.ssh_config.exists());
        assert!(h.downloader.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_helper_stops_before_disk() {
        let mut h = Harness::new();
        h.assets = FakeAssets::with(&[HYPERKIT_TOOL]);

        let err = h.provision(DEFAULTS).unwrap_err();

        assert!(matches!(&err, Error::Step { step, .. } if step == STEP_TOOLS));
        assert_eq!(err.exit_code(), 1);
        let staged: Vec<_> = fs::read_dir(&h.paths.bin_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(staged, vec![HYPERKIT_TOOL]);
        assert!(!h.paths.disk_file.exists());
        assert_eq!(h.runner.programs(), vec!["ssh-keygen"]);
        assert!(h.downloader.calls.borrow().is_empty());
        // Steps before the failure stay in place.
        assert!(h.paths.config_file.exists());
        assert!(h.paths.ssh_key.exists());
    }

    #[test]
    fn test_disk_failure_propagates_exit_code() {
        let mut h = Harness::new();
        h.runner = FakeRunner::failing("qcow-tool", 3, "unsupported size");

        let err = h.provision(DEFAULTS).unwrap_err();

        let message = format!("{} failed: unsupported size", h.paths.tool("qcow-tool").display());
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), format!("{STEP_DISK}: {message}"));
        assert_eq!(h.reporter.events.last().unwrap(), &format!("fail {STEP_DISK}: {message}"));
        assert!(h.downloader.calls.borrow().is_empty());
    }

    #[test]
    fn test_download_failure_is_last() {
        let mut h = Harness::new();
        h.downloader.fail = true;

        let err = h.provision(DEFAULTS).unwrap_err();

        assert!(matches!(&err, Error::Step { step, .. } if step == STEP_DOWNLOAD));
        assert_eq!(err.exit_code(), 1);
        assert!(h.paths.disk_file.exists());
        assert!(!h.paths.config_dir.join("bzImage").exists());
    }

    #[test]
    fn test_handoff_gets_entered_hostname() {
        let mut h = Harness::new();

        h.provision_and_handoff(&format!("vm.local\n{}", &DEFAULTS[1..])).unwrap();

        assert_eq!(h.runner.programs(), vec!["ssh-keygen", "qcow-tool", "sudo"]);
        let calls = h.runner.calls.borrow();
        let (program, args) = calls.last().unwrap();
        assert_eq!(program, handoff::SUDO);
        assert_eq!(
            args,
            &vec![
                "/usr/local/bin/dlite-setup".to_string(),
                "vm.local".to_string(),
                h.identity.home.to_string_lossy().to_string(),
            ]
        );
    }

    #[test]
    fn test_no_handoff_after_failed_step() {
        let mut h = Harness::new();
        h.downloader.fail = true;

        let err = h.provision_and_handoff(DEFAULTS).unwrap_err();

        assert!(matches!(&err, Error::Step { step, .. } if step == STEP_DOWNLOAD));
        assert!(!h.runner.programs().contains(&"sudo".to_string()));
    }

    #[test]
    fn test_setup_failure_keeps_provisioned_install() {
        let mut h = Harness::new();
        h.runner = FakeRunner::failing("sudo", 4, "setup failed");

        let err = h.provision_and_handoff(DEFAULTS).unwrap_err();

        assert_eq!(err.exit_code(), 4);
        assert!(h.paths.config_file.exists());
        assert!(h.paths.disk_file.exists());
    }
}
