//! Spinner for long-running provisioning steps.
//!
//! # Example
//!
//! ```rust,ignore
//! use dlite::tui;
//!
//! let spin = tui::start_spinner("Creating disk");
//! match build_disk() {
//!     Ok(()) => spin.success("Creating disk ..... OK"),
//!     Err(e) => spin.failure(&e.to_string()),
//! }
//! ```

use std::{
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use teapot::{
    Model,
    components::{Spinner, SpinnerStyle},
    output::{is_ci, is_tty},
    style::{CLEAR_LINE, Color},
};

/// Handle to control a running spinner.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }

    /// Stop with a success message.
    pub fn success(mut self, message: &str) {
        self.stop();
        clear_line();
        teapot::output::success(message);
    }

    /// Stop with a failure message.
    pub fn failure(mut self, message: &str) {
        self.stop();
        clear_line();
        teapot::output::error(message);
    }

}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start a spinner that can be manually controlled.
///
/// When stderr is not a terminal, or when running in CI, the message is
/// printed once and nothing animates.
pub fn start(message: impl Into<String>) -> SpinnerHandle {
    let message = message.into();
    let running = Arc::new(AtomicBool::new(true));

    if !is_tty() || is_ci() {
        teapot::output::info(&message);
        return SpinnerHandle { running, join_handle: None };
    }

    let running_clone = Arc::clone(&running);
    let join_handle = std::thread::spawn(move || {
        let mut spinner =
            Spinner::new().style(SpinnerStyle::Dots).color(Color::Cyan).message(&message);
        let interval = SpinnerStyle::Dots.interval();

        while running_clone.load(Ordering::SeqCst) {
            eprint!("\r{}{}", CLEAR_LINE, spinner.view());
            let _ = io::stderr().flush();

            spinner.tick();
            std::thread::sleep(interval);
        }

        eprint!("\r{CLEAR_LINE}");
        let _ = io::stderr().flush();
    });

    SpinnerHandle { running, join_handle: Some(join_handle) }
}

/// Clear the current line.
fn clear_line() {
    if is_tty() && !is_ci() {
        eprint!("\r{CLEAR_LINE}");
        let _ = io::stderr().flush();
    }
}
