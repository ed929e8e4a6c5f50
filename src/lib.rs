//! # Tickline
//!
//! The core of a live, scrolling price chart, for native and WASM targets.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: price points, the stream windower, the cadence tracker and
//!    the chart renderer (always available, WASM-safe)
//! 2. **HTTP API**: `ChartHttp` with retry policies, used for the bootstrap
//!    snapshot
//! 3. **WebSocket**: reconnecting feed connection, compile-time dispatch to
//!    `tokio-tungstenite` (native) or `web-sys` (WASM)
//! 4. **Stream driver**: `PriceStream`, which owns a windower and runs the
//!    bootstrap and the live feed on one event loop
//! 5. **High-Level Client**: `TicklineClient`, a builder over the feed
//!    configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickline::prelude::*;
//!
//! let client = TicklineClient::builder()
//!     .pair(SymbolPair::new("btc", "usdt"))
//!     .window_for_width(1200.0)
//!     .build()?;
//!
//! let stream = client.stream(KlineFormatter::new());
//! let mut cadence = CadenceTracker::new(0u64, DEFAULT_CADENCE);
//! let mut renderer = ChartRenderer::new();
//!
//! let snapshot = stream.snapshot();
//! let duration = cadence.observe(&snapshot.revision);
//! if let Some(scene) = renderer.render(
//!     snapshot.points(),
//!     Viewport::new(1200.0, 400.0),
//!     &ChartStyle::default(),
//!     duration,
//! ) {
//!     let svg = to_svg(&scene.frame_at(std::time::Duration::ZERO));
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Symbol pair, interval and display formatting.
pub mod shared;

/// Domain modules: price points, wire types, conversions.
pub mod domain;

/// Stream windower: the bounded window of recent points.
pub mod stream;

/// Cadence tracker: transition duration from measured update spacing.
pub mod cadence;

/// Chart renderer: scales, path, marker, transitions, SVG output.
pub mod render;

/// Unified error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// Reconnecting WebSocket client, events and ready state.
pub mod ws;

// Layer 4 (stream driver) lives in `stream::native` / `stream::wasm`.

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `TicklineClient`, the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared types
    pub use crate::shared::fmt::{format_number, FormatNumberOptions};
    pub use crate::shared::{Interval, SymbolPair};

    // Domain types
    pub use crate::domain::price::{Formatter, KlineFormatter, PricePoint};

    // Stream windower
    pub use crate::stream::{
        Admission, BootstrapFuture, ConnectionState, StreamConfig, StreamWindower, Window,
        WindowSnapshot,
    };
    #[cfg(feature = "ws-native")]
    pub use crate::stream::native::PriceStream;
    #[cfg(feature = "ws-wasm")]
    pub use crate::stream::wasm::PriceStream as WasmPriceStream;

    // Cadence
    pub use crate::cadence::{CadenceTracker, DEFAULT_CADENCE};

    // Renderer
    pub use crate::render::svg::to_svg;
    pub use crate::render::{
        Animator, ChartRenderer, ChartStyle, Easing, Frame, Point, Scene, Viewport, YDomain,
    };

    // Errors
    pub use crate::error::{ChartError, HttpError, WsError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{PriceHistorySubClient, TicklineClient, TicklineClientBuilder};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{ReadyState, WsConfig, WsEvent};
}
