//! Formatting helpers for terminal output.

pub mod format;

pub use format::{format_dates, format_optional, format_percent, truncate_string};
