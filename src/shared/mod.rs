//! Shared newtypes and utilities used across all modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw format the feed uses, so they can be used directly
//! in wire types without conversion overhead.

pub mod fmt;
pub mod serde_util;

use serde::{Deserialize, Serialize};

// ─── SymbolPair ──────────────────────────────────────────────────────────────

/// A traded pair, e.g. `btc` / `usdt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolPair {
    pub base: String,
    pub quote: String,
}

impl SymbolPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Lower-case concatenation used in stream names (`btcusdt`).
    pub fn stream_name(&self) -> String {
        format!("{}{}", self.base, self.quote).to_lowercase()
    }

    /// Upper-case concatenation used by the REST API (`BTCUSDT`).
    pub fn rest_symbol(&self) -> String {
        format!("{}{}", self.base, self.quote).to_uppercase()
    }
}

impl Default for SymbolPair {
    fn default() -> Self {
        Self::new("btc", "usdt")
    }
}

impl std::fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base.to_uppercase(), self.quote.to_uppercase())
    }
}

// ─── Interval ────────────────────────────────────────────────────────────────

/// Kline interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1s")]
    Second1,
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second1 => "1s",
            Self::Minute1 => "1m",
            Self::Minute3 => "3m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Day3 => "3d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Utilities ───────────────────────────────────────────────────────────────

/// Build the kline stream address for a pair and interval.
///
/// Format: `{ws_base}/{basequote}@kline_{interval}`
pub fn kline_stream_url(ws_base: &str, pair: &SymbolPair, interval: Interval) -> String {
    format!(
        "{}/{}@kline_{}",
        ws_base.trim_end_matches('/'),
        pair.stream_name(),
        interval.as_str()
    )
}
