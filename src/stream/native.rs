//! Native stream driver: one tokio task owning the windower.
//!
//! The bootstrap future and the feed events are raced inside a single
//! `select!` loop, so the windower sees them strictly one at a time and the
//! replace-only-if-longer rule settles the race without locks. Consumers get
//! read-only [`WindowSnapshot`]s through a `watch` channel.

use std::time::Duration;

use futures_util::future::OptionFuture;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{Admission, BootstrapFuture, ConnectionState, StreamConfig, StreamWindower, WindowSnapshot};
use crate::domain::price::Formatter;
use crate::ws::native::WsClient;
use crate::ws::{ReadyState, WsConfig, WsEvent};

enum Command {
    Close,
}

/// A live, self-reconnecting price window.
///
/// Must be created inside a tokio runtime.
pub struct PriceStream {
    snapshot_rx: watch::Receiver<WindowSnapshot>,
    cmd_tx: Option<mpsc::Sender<Command>>,
    task_handle: Option<JoinHandle<()>>,
}

impl PriceStream {
    /// Start the windower: connect to the feed and, if given, run the
    /// bootstrap loader once.
    pub fn spawn<F>(
        ws_config: WsConfig,
        config: StreamConfig,
        formatter: F,
        bootstrap: Option<BootstrapFuture>,
    ) -> Self
    where
        F: Formatter + Send + 'static,
    {
        let windower = StreamWindower::new(config, formatter);
        let (snapshot_tx, snapshot_rx) = watch::channel(windower.snapshot());
        let (cmd_tx, cmd_rx) = mpsc::channel(1);

        let handle = tokio::spawn(run_task(
            windower,
            WsClient::new(ws_config),
            bootstrap,
            snapshot_tx,
            cmd_rx,
        ));

        Self {
            snapshot_rx,
            cmd_tx: Some(cmd_tx),
            task_handle: Some(handle),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> WindowSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.snapshot_rx.borrow().state
    }

    /// A receiver that is notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<WindowSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Snapshots as a stream, one item per published change.
    pub fn updates(&self) -> impl Stream<Item = WindowSnapshot> + Send + 'static {
        let mut rx = self.snapshot_rx.clone();
        async_stream::stream! {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                yield snapshot;
            }
        }
    }

    /// Close the feed connection and stop the windower. Nothing mutates the
    /// window afterwards, including a still-pending bootstrap.
    pub async fn close(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Close).await;
        }
        if let Some(mut handle) = self.task_handle.take() {
            if tokio::time::timeout(Duration::from_secs(10), &mut handle)
                .await
                .is_err()
            {
                tracing::warn!("Stream task did not stop in time, aborting");
                handle.abort();
            }
        }
    }
}

impl Drop for PriceStream {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

/// Publish only when the window or the flags changed.
fn publish<F: Formatter>(tx: &watch::Sender<WindowSnapshot>, windower: &StreamWindower<F>) {
    tx.send_if_modified(|current| {
        if current.revision == windower.revision() && current.state == windower.state() {
            return false;
        }
        *current = windower.snapshot();
        true
    });
}

async fn run_task<F: Formatter>(
    mut windower: StreamWindower<F>,
    mut client: WsClient,
    bootstrap: Option<BootstrapFuture>,
    snapshot_tx: watch::Sender<WindowSnapshot>,
    mut cmd_rx: mpsc::Receiver<Command>,
) {
    let mut bootstrap_pending = bootstrap.is_some();
    let mut bootstrap = OptionFuture::from(bootstrap);

    if let Err(e) = client.connect().await {
        tracing::error!("Failed to start feed connection: {}", e);
    }

    {
        let mut events = client.events();

        loop {
            tokio::select! {
                result = &mut bootstrap, if bootstrap_pending => {
                    bootstrap_pending = false;
                    let points = match result {
                        Some(Ok(points)) => points,
                        Some(Err(e)) => {
                            tracing::error!("Error fetching initial data: {}", e);
                            Vec::new()
                        }
                        None => Vec::new(),
                    };
                    windower.apply_bootstrap(points);
                    publish(&snapshot_tx, &windower);
                }

                event = events.next() => {
                    match event {
                        Some(WsEvent::Message(raw)) => {
                            if windower.on_message(&raw) == Admission::Closed {
                                break;
                            }
                        }
                        Some(WsEvent::Connected) => windower.on_state_change(ReadyState::Open),
                        Some(WsEvent::Disconnected { code, reason }) => {
                            tracing::info!("Feed disconnected: code={:?} reason={}", code, reason);
                            windower.on_state_change(ReadyState::Closed);
                        }
                        Some(WsEvent::Error(e)) => {
                            tracing::debug!("Feed error: {}", e);
                        }
                        None => break,
                    }
                    publish(&snapshot_tx, &windower);
                }

                _ = cmd_rx.recv() => break,
            }
        }
    }

    windower.close();
    publish(&snapshot_tx, &windower);
    client.disconnect().await;
    tracing::info!("Price stream closed");
}
