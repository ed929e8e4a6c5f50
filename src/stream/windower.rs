//! The synchronous windower state machine.

use std::sync::Arc;

use super::{Admission, ConnectionState, StreamConfig, Window, WindowSnapshot};
use crate::domain::price::{Formatter, PricePoint};
use crate::ws::ReadyState;

/// Owns one chart's window and connection flags.
///
/// Every method is a plain state transition; the caller decides which event
/// loop delivers the inputs. After [`StreamWindower::close`] every input is
/// ignored, which is how a late bootstrap result is kept from mutating a torn
/// down chart.
#[derive(Debug)]
pub struct StreamWindower<F> {
    config: StreamConfig,
    formatter: F,
    window: Window,
    last_admitted: Option<PricePoint>,
    live_messages: usize,
    connected: bool,
    closed: bool,
    revision: u64,
}

impl<F: Formatter> StreamWindower<F> {
    pub fn new(config: StreamConfig, formatter: F) -> Self {
        Self {
            config,
            formatter,
            window: Window::new(config.size),
            last_admitted: None,
            live_messages: 0,
            connected: false,
            closed: false,
            revision: 0,
        }
    }

    /// Track the transport state. Opening resets the trust counter.
    pub fn on_state_change(&mut self, state: ReadyState) {
        if self.closed {
            return;
        }
        let open = state == ReadyState::Open;
        if open && !self.connected {
            self.live_messages = 0;
        }
        self.connected = open;
    }

    /// Feed one raw message through the formatter into the window.
    pub fn on_message(&mut self, raw: &str) -> Admission {
        if self.closed {
            return Admission::Closed;
        }

        self.live_messages = self.live_messages.saturating_add(1);

        let Some(point) = self.formatter.format(raw) else {
            return Admission::Discarded;
        };

        if self.last_admitted.as_ref() == Some(&point) {
            return Admission::Duplicate;
        }

        self.window.push(point);
        self.last_admitted = Some(point);
        self.revision += 1;
        Admission::Admitted
    }

    /// Apply the bootstrap result. Replaces the window only when the snapshot
    /// holds more points than the window does; returns whether it did.
    pub fn apply_bootstrap(&mut self, points: Vec<PricePoint>) -> bool {
        if self.closed {
            tracing::debug!("Bootstrap resolved after close, ignoring");
            return false;
        }
        if points.len() <= self.window.len() {
            tracing::debug!(
                "Bootstrap of {} point(s) not applied, window already holds {}",
                points.len(),
                self.window.len()
            );
            return false;
        }
        tracing::info!("Bootstrapping window with {} point(s)", points.len());
        self.window.replace(points);
        self.revision += 1;
        true
    }

    /// Stop accepting input. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.connected = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState {
            connected: self.connected,
            trusted: self.live_messages > self.config.trust_threshold,
            pending: self.window.len() < self.config.size,
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            points: Arc::from(self.window.to_vec()),
            revision: self.revision,
            state: self.state(),
            capacity: self.config.size,
        }
    }
}
