//! External program execution.
//!
//! Steps run helper programs through [`CommandRunner`] so tests can record
//! invocations instead of spawning processes.

use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Runs external programs.
pub trait CommandRunner {
    /// Run `program` with captured output, returning stdout.
    ///
    /// A non-zero exit is an [`Error::Subprocess`] carrying the exit code and
    /// stderr verbatim.
    fn run(&self, program: &str, args: &[String]) -> Result<String>;

    /// Run `program` attached to the terminal (for `sudo` password prompts).
    fn run_interactive(&self, program: &str, args: &[String]) -> Result<()>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        tracing::debug!(program, ?args, "Running command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::other(format!("Failed to run {program}: {e}")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() { stdout } else { stderr };
            Err(Error::Subprocess {
                program: program.to_string(),
                code: output.status.code(),
                message: message.into_owned(),
            })
        }
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> Result<()> {
        tracing::debug!(program, ?args, "Running interactive command");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::other(format!("Failed to run {program}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            let message = status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exited with code {c}"));
            Err(Error::Subprocess { program: program.to_string(), code: status.code(), message })
        }
    }
}
