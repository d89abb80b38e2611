//! Progress output
//!
//! Everything here goes to stderr; stdout is reserved for results so that
//! `$(chartship version)` and `--output json` stay machine-readable.

use console::style;
use std::fmt::Display;

/// A step is starting
pub fn step(message: impl Display) {
    eprintln!("{} {}", style("→").blue(), message);
}

/// A step or check succeeded
pub fn success(message: impl Display) {
    eprintln!("  {} {}", style("✓").green(), message);
}

/// Nothing to do
pub fn skipped(message: impl Display) {
    eprintln!("  {} {}", style("•").dim(), message);
}
