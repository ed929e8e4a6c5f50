//! Wire types for the kline feed (WS) and the kline snapshot (REST).

use serde::de::IgnoredAny;
use serde::Deserialize;

/// Kline stream message.
///
/// ```json
/// {"e":"kline","E":1700000000123,"s":"BTCUSDT","k":{"t":1700000000000,"T":1700000000999,
///  "i":"1s","o":"43000.1","c":"43001.0","h":"43002.5","l":"42999.9","v":"1.2","x":false}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "e", default)]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: WsKline,
}

/// The candle carried by a [`KlineEvent`]. Prices are decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct WsKline {
    #[serde(rename = "t", default)]
    pub open_time: i64,
    #[serde(rename = "T", default)]
    pub close_time: i64,
    #[serde(rename = "i", default)]
    pub interval: String,
    #[serde(rename = "o", default)]
    pub open: String,
    #[serde(rename = "c", default)]
    pub close: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "v", default)]
    pub volume: String,
    #[serde(rename = "x", default)]
    pub is_closed: bool,
}

/// One row of the REST kline snapshot (a 12-element JSON array).
///
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
///   trades, taker_base, taker_quote, ignore]`
#[derive(Debug, Clone, Deserialize)]
pub struct RestKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
);

impl RestKline {
    pub fn open_time(&self) -> i64 {
        self.0
    }

    pub fn open(&self) -> &str {
        &self.1
    }

    pub fn high(&self) -> &str {
        &self.2
    }

    pub fn low(&self) -> &str {
        &self.3
    }

    pub fn close(&self) -> &str {
        &self.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kline_event_deserialize() {
        let raw = r#"{"e":"kline","E":1700000000123,"s":"BTCUSDT","k":{"t":1700000000000,"T":1700000000999,"s":"BTCUSDT","i":"1s","f":1,"L":2,"o":"43000.1","c":"43001.0","h":"43002.5","l":"42999.9","v":"1.2","n":3,"x":false,"q":"5.0","V":"0.5","Q":"2.0","B":"0"}}"#;
        let event: KlineEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_time, 1_700_000_000_123);
        assert_eq!(event.kline.high, "43002.5");
        assert_eq!(event.kline.low, "42999.9");
        assert_eq!(event.kline.interval, "1s");
    }

    #[test]
    fn test_rest_kline_deserialize() {
        let raw = r#"[[1700000000000,"100.0","110.0","90.0","104.0","12.5",1700000000999,"1250.0",42,"6.0","600.0","0"]]"#;
        let rows: Vec<RestKline> = serde_json::from_str(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].open_time(), 1_700_000_000_000);
        assert_eq!(rows[0].open(), "100.0");
        assert_eq!(rows[0].close(), "104.0");
    }

    #[test]
    fn test_rest_kline_rejects_short_row() {
        let raw = r#"[1700000000000,"100.0"]"#;
        assert!(serde_json::from_str::<RestKline>(raw).is_err());
    }
}
