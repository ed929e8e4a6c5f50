//! Conversion from wire types to [`PricePoint`], and feed message formatters.

use rand::Rng;

use super::wire::{KlineEvent, RestKline};
use super::PricePoint;
use crate::error::ChartError;

fn parse_decimal(raw: &str, field: &str) -> Result<f64, ChartError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ChartError::parse(format!("Invalid {}: {:?}", field, raw)))?;
    if !value.is_finite() {
        return Err(ChartError::parse(format!("Non-finite {}: {:?}", field, raw)));
    }
    Ok(value)
}

/// Stream kline → point at the event time, priced at the high/low midpoint.
impl TryFrom<KlineEvent> for PricePoint {
    type Error = ChartError;

    fn try_from(event: KlineEvent) -> Result<Self, Self::Error> {
        let high = parse_decimal(&event.kline.high, "high")?;
        let low = parse_decimal(&event.kline.low, "low")?;
        PricePoint::from_millis((high + low) / 2.0, event.event_time)
    }
}

/// Snapshot row → point at the open time, priced at the open/close midpoint.
impl TryFrom<RestKline> for PricePoint {
    type Error = ChartError;

    fn try_from(row: RestKline) -> Result<Self, Self::Error> {
        let open = parse_decimal(row.open(), "open")?;
        let close = parse_decimal(row.close(), "close")?;
        PricePoint::from_millis((close + open) / 2.0, row.open_time())
    }
}

/// Convert snapshot rows, skipping (and logging) rows that fail validation.
pub fn convert_rows(rows: Vec<RestKline>) -> Vec<PricePoint> {
    let total = rows.len();
    let points: Vec<PricePoint> = rows
        .into_iter()
        .filter_map(|row| match PricePoint::try_from(row) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!("Skipping snapshot row: {}", e);
                None
            }
        })
        .collect();
    if points.len() < total {
        tracing::warn!("Converted {}/{} snapshot rows", points.len(), total);
    }
    points
}

// ─── Formatter ───────────────────────────────────────────────────────────────

/// Maps one raw feed message to a point.
///
/// Must never panic: malformed input yields `None` and the message is
/// discarded by the windower.
pub trait Formatter {
    fn format(&self, raw: &str) -> Option<PricePoint>;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> Option<PricePoint>,
{
    fn format(&self, raw: &str) -> Option<PricePoint> {
        self(raw)
    }
}

/// Formatter for kline stream messages.
#[derive(Debug, Clone, Default)]
pub struct KlineFormatter {
    jitter: f64,
}

impl KlineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a uniform offset in `[-amplitude, amplitude)` to every price.
    ///
    /// Demo embellishment for quiet markets; off by default.
    pub fn with_jitter(mut self, amplitude: f64) -> Self {
        self.jitter = if amplitude.is_finite() { amplitude.abs() } else { 0.0 };
        self
    }

    /// Strict parse, for callers that want the error.
    pub fn parse(&self, raw: &str) -> Result<PricePoint, ChartError> {
        let event: KlineEvent = serde_json::from_str(raw)?;
        let point = PricePoint::try_from(event)?;
        if self.jitter > 0.0 {
            let offset = rand::thread_rng().gen_range(-self.jitter..self.jitter);
            return PricePoint::new(point.price + offset, point.time);
        }
        Ok(point)
    }
}

impl Formatter for KlineFormatter {
    fn format(&self, raw: &str) -> Option<PricePoint> {
        match self.parse(raw) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!("Error parsing message: {} (raw: {})", e, raw);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kline_json(event_time: i64, high: &str, low: &str) -> String {
        format!(
            r#"{{"e":"kline","E":{},"s":"BTCUSDT","k":{{"t":0,"T":999,"i":"1s","o":"1","c":"1","h":"{}","l":"{}","v":"0","x":false}}}}"#,
            event_time, high, low
        )
    }

    #[test]
    fn test_kline_midpoint() {
        let point = KlineFormatter::new()
            .format(&kline_json(1_700_000_000_500, "110.0", "90.0"))
            .unwrap();
        assert_eq!(point.price, 100.0);
        assert_eq!(point.millis(), 1_700_000_000_500);
    }

    #[test]
    fn test_malformed_is_discarded() {
        let formatter = KlineFormatter::new();
        assert!(formatter.format("not json").is_none());
        assert!(formatter.format("{}").is_none());
        assert!(formatter.format(&kline_json(1, "abc", "90")).is_none());
        assert!(formatter.format(&kline_json(1, "inf", "90")).is_none());
    }

    #[test]
    fn test_parse_reports_error() {
        let err = KlineFormatter::new().parse("not json").unwrap_err();
        assert!(matches!(err, ChartError::Serde(_)));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let formatter = KlineFormatter::new().with_jitter(10.0);
        for _ in 0..50 {
            let point = formatter.format(&kline_json(1, "100", "100")).unwrap();
            assert!(point.price >= 90.0 && point.price < 110.0);
        }
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |raw: &str| raw.parse::<f64>().ok().and_then(|p| PricePoint::from_millis(p, 0).ok());
        assert_eq!(formatter.format("12.5").map(|p| p.price), Some(12.5));
        assert!(formatter.format("x").is_none());
    }

    #[test]
    fn test_snapshot_row_midpoint() {
        let raw = r#"[[1700000000000,"100.0","110.0","90.0","104.0","1",1700000000999,"1",1,"1","1","0"],
                      [1700000001000,"bad","110.0","90.0","104.0","1",1700000001999,"1",1,"1","1","0"]]"#;
        let rows: Vec<RestKline> = serde_json::from_str(raw).unwrap();
        let points = convert_rows(rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 102.0);
        assert_eq!(points[0].millis(), 1_700_000_000_000);
    }
}
