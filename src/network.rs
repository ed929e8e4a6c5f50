//! Network URL constants for the public price feed.

/// Default REST API base URL (bootstrap snapshot).
pub const DEFAULT_API_URL: &str = "https://api.binance.com";

/// Default WebSocket base URL. A stream name is appended as a path segment.
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";
