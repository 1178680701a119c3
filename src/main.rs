//! dlite
//!
//! Command-line entry point for provisioning the dlite virtual machine.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match dlite::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Don't print if it's an empty error (e.g., from clap usage errors)
            let msg = e.to_string();
            if !msg.is_empty() {
                eprintln!("Error: {e}");
            }

            // exit_code() is always within 1..=255
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            ExitCode::from(code)
        },
    }
}
