//! Native WebSocket client using `tokio-tungstenite`.
//!
//! - Background tokio task for connection management
//! - Unconditional reconnection (immediate after a drop, paced after a
//!   failed attempt or a connection that closed before any message)
//! - Protocol-level ping answered with pong
//! - Stream-based event delivery to the owner, in arrival order

use std::pin::Pin;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::{ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Disconnect,
}

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    UserRequested,
    /// `delivered`: at least one message arrived on the dropped connection.
    Dropped { reason: String, delivered: bool },
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: WsConfig,
    event_tx: mpsc::Sender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    failed_attempts: u32,
    ready_state: Arc<AtomicU16>,
}

impl TaskState {
    async fn emit(&self, event: WsEvent) {
        if self.event_tx.send(event).await.is_err() {
            tracing::debug!("WS event receiver dropped");
        }
    }

    fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.store(state as u16, Ordering::SeqCst);
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native WebSocket client using `tokio-tungstenite`.
///
/// Uses a background tokio task for connection management.
/// The public API communicates with it via mpsc channels.
pub struct WsClient {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
    event_tx: mpsc::Sender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU16>,
}

impl WsClient {
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU16::new(ReadyState::Closed as u16)),
        }
    }

    /// Connect to the feed.
    ///
    /// Spawns a background tokio task that manages the connection and
    /// reconnects until [`WsClient::disconnect`] is called. Idempotent.
    /// Fails only for a URL that can never connect.
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        self.cmd_tx = Some(cmd_tx);
        self.ready_state
            .store(ReadyState::Connecting as u16, Ordering::SeqCst);

        let state = TaskState {
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            failed_attempts: 0,
            ready_state: Arc::clone(&self.ready_state),
        };

        let handle = tokio::spawn(run_task(state));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Disconnect from the feed. No reconnect follows.
    ///
    /// Sends a graceful close to the background task and waits for it to
    /// finish, aborting it if it does not within five seconds.
    pub async fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(mut handle) = self.task_handle.take() {
            if tokio::time::timeout(Duration::from_secs(5), &mut handle)
                .await
                .is_err()
            {
                tracing::warn!("WS task did not stop in time, aborting");
                handle.abort();
            }
        }

        self.ready_state
            .store(ReadyState::Closed as u16, Ordering::SeqCst);
    }

    /// Whether the WebSocket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Get a stream of events from the WebSocket connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection (abandoned if the owner disconnects) ───
        let attempt = tokio::select! {
            result = attempt_connect(&state.config.url) => result,
            _ = state.cmd_rx.recv() => {
                state.set_ready_state(ReadyState::Closed);
                return;
            }
        };

        let (sink, stream) = match attempt {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!("WebSocket connection failed: {}", e);
                state
                    .emit(WsEvent::Error(format!("Connection failed: {}", e)))
                    .await;

                if !state.config.reconnect {
                    state.set_ready_state(ReadyState::Closed);
                    return;
                }
                if !retry_sleep(&mut state).await {
                    state.set_ready_state(ReadyState::Closed);
                    return;
                }
                continue;
            }
        };

        // ── 2. Connected ─────────────────────────────────────────────────
        state.set_ready_state(ReadyState::Open);
        tracing::info!("WebSocket opened: {}", state.config.url);
        state.emit(WsEvent::Connected).await;

        // ── 3. Inner select! loop ────────────────────────────────────────
        let reason = run_connected(&mut state, sink, stream).await;

        // ── 4. Post-disconnect decision ──────────────────────────────────
        state.set_ready_state(ReadyState::Closed);

        match reason {
            DisconnectReason::UserRequested => return,
            DisconnectReason::Dropped { reason, delivered } => {
                if !state.config.reconnect {
                    return;
                }
                if delivered {
                    state.failed_attempts = 0;
                    tracing::info!("Connection dropped ({}), reconnecting", reason);
                    state.set_ready_state(ReadyState::Connecting);
                } else {
                    // Accepted and closed without data: treat as a failed attempt.
                    tracing::warn!("Connection dropped before any message ({})", reason);
                    if !retry_sleep(&mut state).await {
                        state.set_ready_state(ReadyState::Closed);
                        return;
                    }
                }
            }
        }
    }
}

/// The inner connected loop. Runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    let mut delivered = false;
    loop {
        tokio::select! {
            // ── a) Incoming WS frame ─────────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        delivered = true;
                        state.emit(WsEvent::Message(text_str.to_owned())).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        tracing::info!("WebSocket closed: code={}, reason={}", code, reason);
                        state.emit(WsEvent::Disconnected {
                            code: Some(code),
                            reason: reason.clone(),
                        }).await;
                        return DisconnectReason::Dropped { reason, delivered };
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame: ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: reason.clone(),
                        }).await;
                        return DisconnectReason::Dropped { reason, delivered };
                    }
                    None => {
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: "Stream ended".into(),
                        }).await;
                        return DisconnectReason::Dropped {
                            reason: "Stream ended".into(),
                            delivered,
                        };
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Disconnect) => {
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                    None => {
                        // WsClient dropped, clean exit
                        return DisconnectReason::UserRequested;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection with a 30-second timeout.
async fn attempt_connect(
    url: &str,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(Duration::from_secs(30), connect_async(url))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Reconnection pacing ─────────────────────────────────────────────────────

/// Wait before the next attempt. Returns `false` if the owner asked to stop.
async fn retry_sleep(state: &mut TaskState) -> bool {
    state.failed_attempts = state.failed_attempts.saturating_add(1);
    state.set_ready_state(ReadyState::Connecting);

    let delay = Duration::from_millis(state.config.reconnect_delay_ms);
    tracing::info!(
        "Reconnect attempt {} in {}ms",
        state.failed_attempts,
        delay.as_millis()
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = state.cmd_rx.recv() => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
