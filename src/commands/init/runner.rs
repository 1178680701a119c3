//! Sequential step runner.
//!
//! Steps run in declaration order. The first failure stops the run; steps
//! that already completed are left in place, and the documented recovery is
//! to run `dlite init` again.

use super::output::format_dot_leader;
use crate::{
    error::{Error, Result},
    tui::{SpinnerHandle, start_spinner},
};

/// The unit of work behind a step.
pub type Action<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

/// A named provisioning step.
pub struct Step<'a> {
    label: String,
    action: Action<'a>,
}

impl<'a> Step<'a> {
    /// Create a step from a label and its action.
    pub fn new(label: impl Into<String>, action: impl FnOnce() -> Result<()> + 'a) -> Self {
        Self { label: label.into(), action: Box::new(action) }
    }
}

/// Result of running a sequence of steps.
#[derive(Debug)]
pub enum StepOutcome {
    /// Every step completed.
    Success,
    /// A step failed and the remaining steps were not run.
    Failed {
        /// Label of the failed step.
        step: String,
        /// Why it failed.
        error: Error,
        /// Exit code the process should end with.
        exit_code: i32,
    },
}

impl StepOutcome {
    /// Exit code for this outcome (0 on success).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failed { exit_code, .. } => *exit_code,
        }
    }

    /// Convert into a `Result`, wrapping a failure in [`Error::Step`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Success => Ok(()),
            Self::Failed { step, error, exit_code } => {
                Err(Error::Step { step, exit_code, source: Box::new(error) })
            },
        }
    }
}

/// Receives progress notifications from [`run_steps`].
pub trait StepReporter {
    /// A step is about to run.
    fn started(&mut self, label: &str);
    /// The step that last started completed.
    fn succeeded(&mut self, label: &str);
    /// The step that last started failed.
    fn failed(&mut self, label: &str, error: &Error);
}

/// Run `steps` in order, stopping at the first failure.
pub fn run_steps(steps: Vec<Step<'_>>, reporter: &mut dyn StepReporter) -> StepOutcome {
    for Step { label, action } in steps {
        reporter.started(&label);
        tracing::debug!(step = %label, "Running step");

        if let Err(error) = action() {
            tracing::debug!(step = %label, error = %error, "Step failed");
            reporter.failed(&label, &error);
            let exit_code = error.exit_code();
            return StepOutcome::Failed { step: label, error, exit_code };
        }

        reporter.succeeded(&label);
    }

    StepOutcome::Success
}

/// Reports steps on the terminal with a spinner and dot-leader status lines.
#[derive(Default)]
pub struct SpinnerReporter {
    spinner: Option<SpinnerHandle>,
}

impl SpinnerReporter {
    /// Create a reporter with no active spinner.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepReporter for SpinnerReporter {
    fn started(&mut self, label: &str) {
        self.spinner = Some(start_spinner(label));
    }

    fn succeeded(&mut self, label: &str) {
        let line = format_dot_leader(label, "OK");
        match self.spinner.take() {
            Some(spin) => spin.success(&line),
            None => teapot::output::success(&line),
        }
    }

    fn failed(&mut self, label: &str, error: &Error) {
        let line = failure_line(label, error);
        match self.spinner.take() {
            Some(spin) => spin.failure(&line),
            None => teapot::output::error(&line),
        }
    }
}

/// Status line for a failed step: the dot leader with the exit status, then
/// the error indented underneath.
fn failure_line(label: &str, error: &Error) -> String {
    format!(
        "{} (exit {})\n  {}",
        format_dot_leader(label, "FAILED"),
        error.exit_code(),
        error.to_string().trim_end()
    )
}
