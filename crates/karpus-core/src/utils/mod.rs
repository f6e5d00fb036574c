//! Utility functions for parsing and formatting display values.

pub mod format;

pub use format::{format_age, format_amount, parse_amount, parse_numeric_grade, truncate_string};
