//! Terminal output helpers shared by CLI handlers.
//!
//! Human-readable output goes through the styled printers below; `--json`
//! handlers emit a single document through [`json`] instead.

use std::fmt::Display;

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::error::Result;

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {:<14} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if `value` fails to serialize.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
