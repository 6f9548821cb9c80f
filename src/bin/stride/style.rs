//! ANSI colors for CLI output

use stride_leaderboard::names::is_basename;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Bold = 1,
    Dim = 2,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Cyan = 36,
}

pub fn paint(tone: Tone, text: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", tone as u8, text)
}

/// One status line: colored marker, then the message
fn status(marker: &str, tone: Tone, msg: &str) -> String {
    format!("{} {}", paint(tone, marker), msg)
}

pub fn say_ok(msg: &str) {
    println!("{}", status("✓", Tone::Green, msg));
}

pub fn say_err(msg: &str) {
    eprintln!("{}", status("✗", Tone::Red, msg));
}

pub fn say_warn(msg: &str) {
    println!("{}", status("⚠", Tone::Yellow, msg));
}

pub fn say_info(msg: &str) {
    println!("{}", status("ℹ", Tone::Cyan, msg));
}

/// Title underlined to its own width
pub fn section(title: &str) {
    println!();
    println!("{}", paint(Tone::Bold, title));
    println!("{}", "─".repeat(title.chars().count()));
}

pub fn yes_no(value: bool) -> String {
    if value {
        paint(Tone::Green, "yes")
    } else {
        paint(Tone::Yellow, "no")
    }
}

/// Basenames are highlighted so they stand out from plain labels
pub fn runner_label(label: &str) -> String {
    if is_basename(label) {
        paint(Tone::Cyan, label)
    } else {
        label.to_string()
    }
}
