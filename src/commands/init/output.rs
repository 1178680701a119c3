//! Output formatting for init step lines.

use teapot::style::{Color, RESET};

use super::constants::STEP_LINE_WIDTH;

/// Calculate the visible length of a string, stripping ANSI escape sequences.
pub fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

/// Format a line with dot leaders to a status suffix.
///
/// Format: `{text} {dots} {status}` padded to `STEP_LINE_WIDTH`, with the
/// dots dimmed. `OK` is colored green and `FAILED` red.
pub fn format_dot_leader(text: &str, status: &str) -> String {
    let dim = Color::BrightBlack.to_ansi_fg();

    let status_colored = match status.to_uppercase().as_str() {
        "OK" => format!("{}{status}{RESET}", Color::Green.to_ansi_fg()),
        "FAILED" => format!("{}{status}{RESET}", Color::Red.to_ansi_fg()),
        _ => status.to_string(),
    };

    let dots_len = STEP_LINE_WIDTH
        .saturating_sub(visible_len(text))
        .saturating_sub(visible_len(status))
        .saturating_sub(2)
        .max(3);
    let dots = ".".repeat(dots_len);

    format!("{text} {dim}{dots}{RESET} {status_colored}")
}
