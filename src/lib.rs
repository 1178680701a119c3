//! dlite library
//!
//! Provisions a lightweight local virtual machine that runs the Docker
//! daemon for the current user.
//!
//! ## Usage
//!
//! ```bash
//! dlite init            # Configure and provision a new VM
//! dlite --debug init    # Same, with debug logging on stderr
//! ```
//!
//! ## Settings
//!
//! Where the guest OS is downloaded from, which program performs the
//! privileged setup and where helper binaries come from can be changed in
//! `~/.config/dlite/settings.yaml` or with `DLITE_*` environment variables.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod tui;

pub use cli::Cli;
pub use error::{Error, Result};

/// Run the CLI with the given arguments.
///
/// This is the main entry point for the CLI, parsing arguments and
/// dispatching to the appropriate command handler.
pub async fn run(args: Vec<String>) -> Result<()> {
    use clap::Parser;

    // Parse CLI arguments
    let cli_args = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            // Print clap error (includes help/version)
            e.print().ok();
            // Exit successfully for help/version, otherwise return error
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => return Ok(()),
                _ => return Err(Error::other("")),
            }
        },
    };

    // Initialize logging if debug mode
    if cli_args.debug {
        init_logging();
    }

    let ctx = context::Context::new()?;

    commands::execute(&ctx, &cli_args.command).await
}

/// Initialize tracing/logging for debug mode.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dlite=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
