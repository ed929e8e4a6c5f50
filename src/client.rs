//! High-level client: `TicklineClient` with nested sub-client accessors.
//!
//! The client holds the feed configuration (API and WS base URLs, symbol
//! pair, interval, window sizing) and hands out the pieces a chart needs:
//! the bootstrap loader, the feed's [`WsConfig`] and the [`StreamConfig`].

use crate::domain::price::client::PriceHistoryClient;
use crate::error::ChartError;
use crate::http::{ChartHttp, RetryPolicy};
use crate::shared::{Interval, SymbolPair};
use crate::stream::StreamConfig;
use crate::ws::WsConfig;

pub use crate::domain::price::client::PriceHistoryClient as PriceHistorySubClient;

/// The primary entry point.
///
/// One client describes one feed (pair + interval). Cloning is cheap; the
/// HTTP connection pool is shared.
#[derive(Clone)]
pub struct TicklineClient {
    pub(crate) http: ChartHttp,
    pub(crate) ws_config: WsConfig,
    pub(crate) pair: SymbolPair,
    pub(crate) interval: Interval,
    pub(crate) stream_config: StreamConfig,
}

impl TicklineClient {
    pub fn builder() -> TicklineClientBuilder {
        TicklineClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn price_history(&self) -> PriceHistoryClient<'_> {
        PriceHistoryClient { client: self }
    }

    // ── Configuration ────────────────────────────────────────────────────

    /// Feed connection config.
    ///
    /// The WS client is not embedded in `TicklineClient`; its lifetime
    /// belongs to whatever displays the chart.
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    pub fn stream_config(&self) -> StreamConfig {
        self.stream_config
    }

    pub fn pair(&self) -> &SymbolPair {
        &self.pair
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Create a native WS client for the feed.
    #[cfg(feature = "ws-native")]
    pub fn ws_native(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }

    /// Create a WASM WS client for the feed.
    #[cfg(feature = "ws-wasm")]
    pub fn ws_wasm(&self) -> crate::ws::wasm::WsClient {
        crate::ws::wasm::WsClient::new(self.ws_config.clone())
    }

    /// Start a live window on a tokio runtime, seeded by one snapshot of
    /// the window's size.
    #[cfg(feature = "ws-native")]
    pub fn stream<F>(&self, formatter: F) -> crate::stream::native::PriceStream
    where
        F: crate::domain::price::Formatter + Send + 'static,
    {
        let bootstrap = self.bootstrap();
        crate::stream::native::PriceStream::spawn(
            self.ws_config.clone(),
            self.stream_config,
            formatter,
            Some(bootstrap),
        )
    }

    /// Start a live window in the browser. `on_update` receives every
    /// published snapshot.
    #[cfg(feature = "ws-wasm")]
    pub fn stream_wasm<F>(
        &self,
        formatter: F,
        on_update: impl Fn(crate::stream::WindowSnapshot) + 'static,
    ) -> crate::stream::wasm::PriceStream<F>
    where
        F: crate::domain::price::Formatter + 'static,
    {
        let bootstrap = self.bootstrap();
        crate::stream::wasm::PriceStream::spawn(
            self.ws_config.clone(),
            self.stream_config,
            formatter,
            Some(bootstrap),
            on_update,
        )
    }

    #[cfg(any(feature = "ws-native", feature = "ws-wasm"))]
    fn bootstrap(&self) -> crate::stream::BootstrapFuture {
        let limit = u32::try_from(self.stream_config.size).unwrap_or(u32::MAX);
        self.price_history().bootstrap_loader(limit)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct TicklineClientBuilder {
    api_url: String,
    ws_url: String,
    pair: SymbolPair,
    interval: Interval,
    stream_config: StreamConfig,
    reconnect_delay_ms: u64,
    retry: RetryPolicy,
}

impl Default for TicklineClientBuilder {
    fn default() -> Self {
        Self {
            api_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_url: crate::network::DEFAULT_WS_URL.to_string(),
            pair: SymbolPair::default(),
            interval: Interval::default(),
            stream_config: StreamConfig::default(),
            reconnect_delay_ms: WsConfig::default().reconnect_delay_ms,
            retry: RetryPolicy::default(),
        }
    }
}

impl TicklineClientBuilder {
    pub fn api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    /// WS base URL; the stream name is appended as a path segment.
    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn pair(mut self, pair: SymbolPair) -> Self {
        self.pair = pair;
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn window_size(mut self, size: usize) -> Self {
        self.stream_config.size = size;
        self
    }

    /// Size the window from the chart width (one slot per 35px).
    pub fn window_for_width(mut self, width: f64) -> Self {
        self.stream_config.size = StreamConfig::for_width(width).size;
        self
    }

    pub fn trust_threshold(mut self, threshold: usize) -> Self {
        self.stream_config.trust_threshold = threshold;
        self
    }

    pub fn reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<TicklineClient, ChartError> {
        if self.stream_config.size == 0 {
            return Err(ChartError::Other("Window size must be at least 1".to_string()));
        }
        if self.pair.base.is_empty() || self.pair.quote.is_empty() {
            return Err(ChartError::Other(format!("Invalid symbol pair: {}", self.pair)));
        }

        let mut ws_config = WsConfig::kline(&self.ws_url, &self.pair, self.interval);
        ws_config.reconnect_delay_ms = self.reconnect_delay_ms;

        Ok(TicklineClient {
            http: ChartHttp::new(&self.api_url).with_retry(self.retry),
            ws_config,
            pair: self.pair,
            interval: self.interval,
            stream_config: self.stream_config,
        })
    }
}
