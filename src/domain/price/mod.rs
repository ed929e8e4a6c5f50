//! Price domain: the points a chart window is made of.

#[cfg(feature = "http")]
pub mod client;
pub mod convert;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::shared::serde_util::timestamp_ms;

pub use convert::{Formatter, KlineFormatter};

/// A single sample on the chart. Immutable once created.
///
/// Equality is by value: two points with the same price and time are the
/// same point, which is what the window's dedup guard relies on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    #[serde(with = "timestamp_ms")]
    pub time: DateTime<Utc>,
}

impl PricePoint {
    /// Create a point, rejecting non-finite prices.
    pub fn new(price: f64, time: DateTime<Utc>) -> Result<Self, ChartError> {
        if !price.is_finite() {
            return Err(ChartError::parse(format!("Non-finite price: {}", price)));
        }
        Ok(Self { price, time })
    }

    /// Create a point from an epoch-millis timestamp.
    pub fn from_millis(price: f64, millis: i64) -> Result<Self, ChartError> {
        let time = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| ChartError::parse(format!("Invalid timestamp: {}", millis)))?;
        Self::new(price, time)
    }

    pub fn millis(&self) -> i64 {
        self.time.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_finite() {
        let now = Utc::now();
        assert!(PricePoint::new(f64::NAN, now).is_err());
        assert!(PricePoint::new(f64::INFINITY, now).is_err());
        assert!(PricePoint::new(101.5, now).is_ok());
    }

    #[test]
    fn test_serde_uses_epoch_millis() {
        let point = PricePoint::from_millis(42.5, 1_700_000_000_000).unwrap();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"price":42.5,"time":1700000000000}"#);
        let back: PricePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn test_value_equality() {
        let a = PricePoint::from_millis(1.0, 1000).unwrap();
        let b = PricePoint::from_millis(1.0, 1000).unwrap();
        let c = PricePoint::from_millis(1.0, 2000).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
