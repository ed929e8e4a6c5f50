//! WebSocket layer: reconnecting feed connection, events, ready state.
//!
//! The actual WS transport is compile-time dispatched:
//! - `ws-native` feature → `tokio-tungstenite` (native.rs)
//! - `ws-wasm` feature → `web-sys::WebSocket` (wasm.rs)
//!
//! Both export a `WsClient` with the same surface: connect, close, event
//! delivery and a pollable [`ReadyState`]. Reconnection is internal and
//! unconditional unless the owner closes the connection.

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod wasm;

use crate::error::WsError;
use crate::shared::{kline_stream_url, Interval, SymbolPair};

// ─── ReadyState ──────────────────────────────────────────────────────────────

/// Connection state, numbered like the browser `WebSocket.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u16> for ReadyState {
    fn from(value: u16) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// Events emitted by the WS client to its owner.
///
/// Messages are delivered raw; interpreting them is the formatter's job.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// A text frame from the server.
    Message(String),
    /// Connection established (also after every reconnect).
    Connected,
    /// Connection lost (a reconnect follows unless the owner closed it).
    Disconnected { code: Option<u16>, reason: String },
    /// A transport error that did not by itself close the connection.
    Error(String),
}

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    /// Reconnect after any drop not requested by the owner.
    pub reconnect: bool,
    /// Wait between failed connection attempts, and after a connection that
    /// dropped before delivering a message. Any other drop is retried
    /// immediately.
    pub reconnect_delay_ms: u64,
}

impl WsConfig {
    /// Config for the kline stream of `pair` at `interval`.
    pub fn kline(ws_base: &str, pair: &SymbolPair, interval: Interval) -> Self {
        Self {
            url: kline_stream_url(ws_base, pair, interval),
            ..Self::default()
        }
    }
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: kline_stream_url(
                crate::network::DEFAULT_WS_URL,
                &SymbolPair::default(),
                Interval::default(),
            ),
            reconnect: true,
            reconnect_delay_ms: 1000,
        }
    }
}

impl WsConfig {
    /// Reject a URL no connection attempt could ever succeed with, so it is
    /// reported once instead of being retried forever.
    pub fn validate(&self) -> Result<(), WsError> {
        let url = self.url.as_str();
        let rest = url
            .strip_prefix("wss://")
            .or_else(|| url.strip_prefix("ws://"))
            .ok_or_else(|| WsError::InvalidUrl(format!("expected ws:// or wss://: {}", url)))?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || url.chars().any(char::is_whitespace) {
            return Err(WsError::InvalidUrl(url.to_string()));
        }
        Ok(())
    }
}

// ─── Rotation ────────────────────────────────────────────────────────────────

/// Holds the resource of the live connection plus the last one it replaced.
///
/// A resource that may still be executing (a socket callback, a fired timer)
/// is parked rather than dropped, and freed by the next rotation. At most two
/// are alive at any time, however often the connection cycles.
#[cfg(any(feature = "ws-wasm", test))]
pub(crate) struct Rotation<T> {
    current: Option<T>,
    retired: Option<T>,
}

#[cfg(any(feature = "ws-wasm", test))]
impl<T> Rotation<T> {
    pub(crate) const fn new() -> Self {
        Self {
            current: None,
            retired: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Make `next` current. A displaced current is parked.
    pub(crate) fn install(&mut self, next: T) {
        if let Some(prev) = self.current.replace(next) {
            self.retired = Some(prev);
        }
    }

    /// Park the current resource, freeing the one parked before it.
    pub(crate) fn retire(&mut self) {
        if let Some(prev) = self.current.take() {
            self.retired = Some(prev);
        }
    }

    /// Drop the current resource now. Only for resources known not to be
    /// executing.
    pub(crate) fn cancel(&mut self) {
        self.current = None;
    }
}
