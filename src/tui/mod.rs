//! Terminal UI helpers using Teapot.
//!
//! CLI-friendly wrappers for spinners, forms, interactive prompts, and
//! confirmations. Every helper degrades to plain line output when stderr is
//! not a terminal or when running in CI.

mod confirm;
mod form;
mod prompt;
mod spinner;

pub use form::{FormPrompt, use_forms};
pub use prompt::{LinePrompt, Prompt, StdioPrompt};
pub use spinner::{SpinnerHandle, start as start_spinner};
