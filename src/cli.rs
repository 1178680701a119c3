//! Command-line argument parsing and command definitions.
//!
//! Uses clap with derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, builder::FalseyValueParser};

/// dlite - Docker on a lightweight local virtual machine
#[derive(Parser, Debug)]
#[command(name = "dlite")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, env = "DLITE_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new virtual machine for the current user
    ///
    /// Prompts for the VM configuration, generates an SSH key, stages the
    /// helper binaries, creates the disk and downloads the guest OS. Finishes
    /// by running the privileged setup under sudo. Re-running destroys the
    /// existing VM after confirmation.
    Init,
}
