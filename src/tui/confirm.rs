//! Confirmation prompt rendering.
//!
//! Destructive confirmations only accept an explicit yes; anything else,
//! including an empty answer, declines.

use teapot::{
    Model,
    components::Confirm as TeapotConfirm,
    output::{is_ci, is_tty},
    style::{Color, RESET},
};

/// Render a destructive confirmation prompt.
///
/// On a terminal this uses Teapot's Confirm component with danger styling;
/// otherwise it falls back to a plain `(y/n)` suffix.
pub fn render_danger(message: &str) -> String {
    if !is_tty() || is_ci() {
        return format!("{message} (y/n) ");
    }

    let confirm = TeapotConfirm::new(message)
        .default(false)
        .yes_label("Yes, destroy it")
        .no_label("Cancel")
        .selected_color(Color::Red);

    format!("{}⚠{} {} ", Color::Red.to_ansi_fg(), RESET, confirm.view())
}

/// Parse a confirmation answer. Only `y` or `yes` confirm.
pub fn is_confirmed(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
