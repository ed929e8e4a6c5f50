//! Number formatting utilities for human-readable display.
//!
//! Handles f64 values with compact magnitude labels (K/M/B/…), thousands
//! separators, significant-decimal truncation and subscript notation for long
//! zero runs inside the decimal part (`1.10₍₅₎2`).

/// Magnitude sectors: label, exclusive upper bound, divisor.
const SECTORS: [(&str, f64, f64); 9] = [
    ("K", 1e6, 1e3),
    ("M", 1e9, 1e6),
    ("B", 1e12, 1e9),
    ("T", 1e15, 1e12),
    ("Qa", 1e18, 1e15),
    ("Qi", 1e21, 1e18),
    ("Sx", 1e24, 1e21),
    ("Sp", 1e27, 1e24),
    ("Oc", f64::INFINITY, 1e27),
];

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Options for [`format_number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatNumberOptions {
    /// `1520000` → `1.52M`
    pub compact_integer: bool,
    /// `1234` → `1,234`
    pub separate_by_comma: bool,
    /// Significant decimals kept after the leading zeros of the decimal part.
    /// `Some(2)`: `2.001234` → `2.0012`, `2.120` → `2.12`. `None` keeps all.
    pub decimal_length: Option<usize>,
    /// `1.1000002` → `1.10₍₅₎2`
    pub minify_decimal_repeats: bool,
}

impl FormatNumberOptions {
    /// The convention used by the chart's leading price label.
    pub fn price_label() -> Self {
        Self {
            compact_integer: true,
            separate_by_comma: true,
            decimal_length: Some(3),
            minify_decimal_repeats: true,
        }
    }
}

/// Plain positional rendering. Rust's `Display` for `f64` never switches to
/// exponent notation, so no power resolution is needed.
fn plain(value: f64) -> String {
    format!("{}", value)
}

/// Splits off a magnitude label when `|value| >= 999`.
///
/// Returns the scaled value as a string and the label (empty when no
/// compaction applies).
pub fn compress_by_label(value: f64) -> (String, &'static str) {
    let abs_value = value.abs();
    if abs_value > 1e3 - 1.0 {
        for (label, max, divide) in SECTORS {
            if abs_value < max {
                return (plain(value / divide), label);
            }
        }
    }
    (plain(value), "")
}

/// Adds thousands separators to an integer string, keeping a leading sign.
pub fn separate_by_comma(integer_part: &str) -> String {
    let grouped = integer_part
        .chars()
        .rev()
        .collect::<String>()
        .as_bytes()
        .chunks(3)
        .map(|c| std::str::from_utf8(c).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect::<String>();

    grouped
        .strip_prefix("-,")
        .map(|rest| format!("-{}", rest))
        .unwrap_or(grouped)
}

/// Keeps `first_non_zero + length` digits of a decimal part, then trims
/// trailing zeros. No rounding is applied.
fn cut_end_of_number(decimal_part: &str, length: Option<usize>) -> String {
    if decimal_part.is_empty() {
        return String::new();
    }

    let kept = match length {
        Some(length) => {
            let end = match decimal_part.find(|c: char| c != '0') {
                Some(first_non_zero) => first_non_zero + length,
                None => length.saturating_sub(1),
            };
            &decimal_part[..end.min(decimal_part.len())]
        }
        None => decimal_part,
    };

    kept.trim_end_matches('0').to_string()
}

fn subscript(n: usize) -> String {
    n.to_string()
        .chars()
        .filter_map(|d| d.to_digit(10).map(|d| SUBSCRIPT_DIGITS[d as usize]))
        .collect()
}

/// Replaces runs of three or more zeros with `0₍n₎`.
///
/// Only runs followed by another digit are emitted; a trailing run is
/// dropped (trailing zeros carry no value in a decimal part).
fn minify_number_repeats(digits: &str) -> String {
    let mut zero_run = 0usize;
    let mut output = String::with_capacity(digits.len());

    for ch in digits.chars() {
        if ch == '0' {
            zero_run += 1;
            continue;
        }
        if zero_run > 0 {
            if zero_run <= 2 {
                output.push_str(&"0".repeat(zero_run));
            } else {
                output.push('0');
                output.push('₍');
                output.push_str(&subscript(zero_run));
                output.push('₎');
            }
            zero_run = 0;
        }
        output.push(ch);
    }

    output
}

/// Format an f64 for display according to `options`.
pub fn format_number(value: f64, options: &FormatNumberOptions) -> String {
    let (raw, label) = if options.compact_integer {
        compress_by_label(value)
    } else {
        (plain(value), "")
    };

    let (integer_part, decimal_part) = match raw.split_once('.') {
        Some((integer, decimal)) => (integer.to_string(), decimal.to_string()),
        None => (raw, String::new()),
    };

    let integer_part = if options.separate_by_comma {
        separate_by_comma(&integer_part)
    } else {
        integer_part
    };

    let mut decimal_part = cut_end_of_number(&decimal_part, options.decimal_length);

    if options.minify_decimal_repeats {
        decimal_part = minify_number_repeats(&decimal_part);
    }

    let mut output = integer_part;
    if !decimal_part.is_empty() {
        output.push('.');
        output.push_str(&decimal_part);
    }
    output.push_str(label);
    output
}
