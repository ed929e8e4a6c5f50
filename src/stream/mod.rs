//! Stream windower: the bounded, deduplicated window of recent points kept
//! in sync with a live feed and seeded by a one-time snapshot.
//!
//! [`StreamWindower`] is the synchronous core: it is driven by three inputs
//! (connection state changes, raw messages, the bootstrap result) and owns
//! the [`Window`] exclusively. Drivers run it on a single event loop:
//! - `ws-native` → [`native::PriceStream`], one tokio task
//! - `ws-wasm` → [`wasm::PriceStream`], browser callbacks

pub mod windower;

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod wasm;

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::domain::price::PricePoint;
use crate::error::ChartError;

pub use windower::StreamWindower;

/// The one-time snapshot loader handed to a driver.
#[cfg(not(target_arch = "wasm32"))]
pub type BootstrapFuture =
    Pin<Box<dyn Future<Output = Result<Vec<PricePoint>, ChartError>> + Send + 'static>>;

/// The one-time snapshot loader handed to a driver.
#[cfg(target_arch = "wasm32")]
pub type BootstrapFuture = Pin<Box<dyn Future<Output = Result<Vec<PricePoint>, ChartError>> + 'static>>;

// ─── StreamConfig ────────────────────────────────────────────────────────────

/// Window sizing and trust gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Maximum number of points kept (`N`).
    pub size: usize,
    /// `trusted` once more than this many live messages arrived since the
    /// connection opened.
    pub trust_threshold: usize,
}

impl StreamConfig {
    /// Horizontal pixels per sample slot when sizing a window from the viewport.
    pub const SLOT_WIDTH_PX: f64 = 35.0;

    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// One sample slot per 35px of viewport width, at least one.
    pub fn for_width(width: f64) -> Self {
        let slots = if width.is_finite() && width > 0.0 {
            (width / Self::SLOT_WIDTH_PX).floor() as usize
        } else {
            0
        };
        Self::new(slots.max(1))
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            size: 30,
            trust_threshold: 2,
        }
    }
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// Fixed-capacity FIFO of points, in arrival order.
///
/// - `push` evicts from the front when full.
/// - `replace` installs a whole sequence, keeping its newest `capacity` points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Window {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl Window {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: PricePoint) {
        // Capacity 0 stores nothing.
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn replace(&mut self, points: Vec<PricePoint>) {
        let skip = points.len().saturating_sub(self.capacity);
        self.points.clear();
        self.points.extend(points.into_iter().skip(skip));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<PricePoint> {
        self.points.iter().copied().collect()
    }
}

// ─── ConnectionState ─────────────────────────────────────────────────────────

/// Derived connectivity flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    /// Enough live messages since the connection opened to believe the data.
    pub trusted: bool,
    /// The window holds fewer than `N` points.
    pub pending: bool,
}

impl ConnectionState {
    /// Whether a chart should be drawn from this state.
    pub fn is_ready(&self) -> bool {
        self.connected && self.trusted && !self.pending
    }
}

// ─── Admission ───────────────────────────────────────────────────────────────

/// Outcome of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended to the window.
    Admitted,
    /// Value-equal to the last admitted point; dropped.
    Duplicate,
    /// The formatter produced no point.
    Discarded,
    /// The windower was closed; nothing happens any more.
    Closed,
}

// ─── WindowSnapshot ──────────────────────────────────────────────────────────

/// Read-only view of a windower handed to consumers.
///
/// `revision` increments on every window mutation, so two snapshots with the
/// same revision hold the same points.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub points: Arc<[PricePoint]>,
    pub revision: u64,
    pub state: ConnectionState,
    pub capacity: usize,
}

impl WindowSnapshot {
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Percentage of the window that is filled, rounded up.
    pub fn progress(&self) -> u8 {
        if self.capacity == 0 {
            return 100;
        }
        let pct = (self.points.len() * 100).div_ceil(self.capacity);
        pct.min(100) as u8
    }

    /// Loading text for the current state, `None` once the chart can render.
    pub fn status(&self) -> Option<String> {
        if !self.state.connected {
            Some("Connecting...".to_string())
        } else if !self.state.trusted {
            Some("Establishing a secure connection...".to_string())
        } else if self.state.pending {
            Some(format!("Preparing... {}%", self.progress()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(price: f64, ms: i64) -> PricePoint {
        PricePoint::from_millis(price, ms).unwrap()
    }

    #[test]
    fn test_window_fifo_eviction() {
        let mut window = Window::new(3);
        for i in 1..=5 {
            window.push(p(i as f64, i));
            assert!(window.len() <= 3);
        }
        let prices: Vec<f64> = window.iter().map(|pt| pt.price).collect();
        assert_eq!(prices, vec![3.0, 4.0, 5.0]);
        assert!(window.is_full());
    }

    #[test]
    fn test_window_zero_capacity_stores_nothing() {
        let mut window = Window::new(0);
        window.push(p(1.0, 1));
        assert!(window.is_empty());
    }

    #[test]
    fn test_window_replace_keeps_newest() {
        let mut window = Window::new(2);
        window.replace(vec![p(1.0, 1), p(2.0, 2), p(3.0, 3)]);
        let prices: Vec<f64> = window.iter().map(|pt| pt.price).collect();
        assert_eq!(prices, vec![2.0, 3.0]);
    }

    #[test]
    fn test_config_for_width() {
        assert_eq!(StreamConfig::for_width(1400.0).size, 40);
        assert_eq!(StreamConfig::for_width(10.0).size, 1);
        assert_eq!(StreamConfig::for_width(f64::NAN).size, 1);
        assert_eq!(StreamConfig::for_width(700.0).trust_threshold, 2);
    }

    #[test]
    fn test_snapshot_status_text() {
        let mut snapshot = WindowSnapshot {
            points: Arc::from(vec![p(1.0, 1)]),
            revision: 1,
            state: ConnectionState::default(),
            capacity: 3,
        };
        assert_eq!(snapshot.status().as_deref(), Some("Connecting..."));

        snapshot.state.connected = true;
        assert_eq!(
            snapshot.status().as_deref(),
            Some("Establishing a secure connection...")
        );

        snapshot.state.trusted = true;
        snapshot.state.pending = true;
        assert_eq!(snapshot.status().as_deref(), Some("Preparing... 34%"));

        snapshot.state.pending = false;
        assert!(snapshot.status().is_none());
        assert!(snapshot.state.is_ready());
    }
}
