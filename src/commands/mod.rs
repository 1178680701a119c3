//! Command implementations for dlite.

pub mod init;

pub use init::init;

use crate::{cli::Commands, context::Context, error::Result};

/// Execute a CLI command.
pub async fn execute(ctx: &Context, command: &Commands) -> Result<()> {
    match command {
        Commands::Init => init(ctx).await,
    }
}
