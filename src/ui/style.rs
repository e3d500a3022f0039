//! Terminal colors, symbols and the progress spinner

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// ANSI color codes from design system
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m"; // #64B5F6
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m"; // #A5D6A7
    pub const WARNING: &str = "\x1b[38;2;255;202;40m"; // #FFCA28
    pub const ERROR: &str = "\x1b[38;2;239;154;154m"; // #EF9A9A
    pub const MUTED: &str = "\x1b[38;2;84;110;122m"; // #546E7A
    pub const FG: &str = "\x1b[38;2;212;212;215m"; // #D4D4D7
}

pub mod symbols {
    pub const PALETTE: &str = "◆";
    pub const FILE: &str = "▸";
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "!";
    pub const SPINNER: [&str; 10] = [
        "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
    ];
}

/// Steady-ticking spinner on stderr
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&symbols::SPINNER);
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Section header used by every command
pub fn print_header(title: &str) {
    println!();
    println!(
        "{}{}  {} {}{}",
        colors::PRIMARY, colors::BOLD, symbols::PALETTE, title, colors::RESET
    );
}

/// `│ label: value` row under a header
pub fn print_row(label: &str, value: impl std::fmt::Display) {
    println!(
        "{}  │ {}: {}{}{}",
        colors::MUTED, label, colors::FG, value, colors::RESET
    );
}

/// Dim warning used when a step falls back to defaults
pub fn print_dim_warning(message: &str) {
    eprintln!(
        "{}  {} {}{}",
        colors::DIM, symbols::WARNING, message, colors::RESET
    );
}

pub fn print_success(message: &str) {
    println!(
        "{}  {} {}{}",
        colors::SUCCESS, symbols::SUCCESS, message, colors::RESET
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        "\n{}  {} Error: {}{}",
        colors::ERROR, symbols::ERROR, message, colors::RESET
    );
}
