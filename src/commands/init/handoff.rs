//! Handoff to the privileged setup program.

use std::path::Path;

use super::process::CommandRunner;
use crate::error::Result;

/// Program used to elevate the setup step.
pub const SUDO: &str = "sudo";

/// Run `setup_program <hostname> <home>` under `sudo`.
///
/// The program inherits the terminal so `sudo` can ask for a password. A
/// non-zero exit is returned as-is; nothing provisioned earlier is undone.
pub fn handoff(
    runner: &dyn CommandRunner,
    setup_program: &str,
    hostname: &str,
    home: &Path,
) -> Result<()> {
    let args = [
        setup_program.to_string(),
        hostname.to_string(),
        home.to_string_lossy().to_string(),
    ];
    runner.run_interactive(SUDO, &args)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::init::process::tests::FakeRunner;

    #[test]
    fn test_handoff_arguments() {
        let runner = FakeRunner::default();

        handoff(&runner, "dlite-setup", "local.docker", Path::new("/Users/alice")).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sudo");
        assert_eq!(calls[0].1, vec!["dlite-setup", "local.docker", "/Users/alice"]);
    }

    #[test]
    fn test_handoff_failure_keeps_exit_code() {
        let runner = FakeRunner::failing("sudo", 4, "exited with code 4");

        let err = handoff(&runner, "dlite-setup", "local.docker", Path::new("/home/a")).unwrap_err();

        assert_eq!(err.exit_code(), 4);
    }
}
