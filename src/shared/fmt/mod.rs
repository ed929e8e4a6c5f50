//! Number formatting for human-readable display (chart labels).

pub mod num;

pub use num::{format_number, FormatNumberOptions};
