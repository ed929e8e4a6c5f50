//! Browser stream driver.
//!
//! The page's event loop is the single thread: socket callbacks and the
//! bootstrap continuation each borrow the windower in turn, so the
//! replace-only-if-longer rule settles their race exactly as on native.
//! Snapshots are pushed to an `on_update` callback.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::{BootstrapFuture, ConnectionState, StreamConfig, StreamWindower, WindowSnapshot};
use crate::domain::price::Formatter;
use crate::ws::wasm::WsClient;
use crate::ws::{ReadyState, WsConfig, WsEvent};

/// Pushes snapshots to the consumer when the window or the flags changed.
struct Publisher {
    last: Cell<(u64, ConnectionState)>,
    on_update: Box<dyn Fn(WindowSnapshot)>,
}

impl Publisher {
    fn publish<F: Formatter>(&self, windower: &RefCell<StreamWindower<F>>) {
        let snapshot = {
            let w = windower.borrow();
            let current = (w.revision(), w.state());
            if self.last.get() == current {
                return;
            }
            self.last.set(current);
            w.snapshot()
        };
        (self.on_update)(snapshot);
    }
}

/// A live, self-reconnecting price window driven by browser callbacks.
pub struct PriceStream<F: Formatter + 'static> {
    windower: Rc<RefCell<StreamWindower<F>>>,
    publisher: Rc<Publisher>,
    client: WsClient,
}

impl<F: Formatter + 'static> PriceStream<F> {
    /// Connect to the feed and, if given, run the bootstrap loader once.
    pub fn spawn(
        ws_config: WsConfig,
        config: StreamConfig,
        formatter: F,
        bootstrap: Option<BootstrapFuture>,
        on_update: impl Fn(WindowSnapshot) + 'static,
    ) -> Self {
        let windower = Rc::new(RefCell::new(StreamWindower::new(config, formatter)));
        let initial = {
            let w = windower.borrow();
            (w.revision(), w.state())
        };
        let publisher = Rc::new(Publisher {
            last: Cell::new(initial),
            on_update: Box::new(on_update),
        });

        let client = WsClient::new(ws_config);
        let connected = client.connect({
            let windower = Rc::downgrade(&windower);
            let publisher = Rc::clone(&publisher);
            move |event| on_event(&windower, &publisher, event)
        });
        if let Err(e) = connected {
            tracing::error!("Failed to start feed connection: {}", e);
        }

        if let Some(fut) = bootstrap {
            let windower = Rc::downgrade(&windower);
            let publisher = Rc::clone(&publisher);
            wasm_bindgen_futures::spawn_local(async move {
                let points = match fut.await {
                    Ok(points) => points,
                    Err(e) => {
                        tracing::error!("Error fetching initial data: {}", e);
                        Vec::new()
                    }
                };
                // Dropped stream: nothing to apply to.
                let Some(windower) = windower.upgrade() else { return };
                windower.borrow_mut().apply_bootstrap(points);
                publisher.publish(&windower);
            });
        }

        Self {
            windower,
            publisher,
            client,
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.windower.borrow().snapshot()
    }

    pub fn state(&self) -> ConnectionState {
        self.windower.borrow().state()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.client.ready_state()
    }

    /// Close the feed and stop the windower. Idempotent.
    pub fn close(&self) {
        if self.windower.borrow().is_closed() {
            return;
        }
        self.client.close();
        self.windower.borrow_mut().close();
        self.publisher.publish(&self.windower);
        tracing::info!("Price stream closed");
    }
}

impl<F: Formatter + 'static> Drop for PriceStream<F> {
    fn drop(&mut self) {
        self.close();
    }
}

fn on_event<F: Formatter>(
    windower: &Weak<RefCell<StreamWindower<F>>>,
    publisher: &Publisher,
    event: WsEvent,
) {
    let Some(windower) = windower.upgrade() else { return };
    {
        let mut w = windower.borrow_mut();
        match event {
            WsEvent::Message(raw) => {
                w.on_message(&raw);
            }
            WsEvent::Connected => w.on_state_change(ReadyState::Open),
            WsEvent::Disconnected { code, reason } => {
                tracing::info!("Feed disconnected: code={:?} reason={}", code, reason);
                w.on_state_change(ReadyState::Closed);
            }
            WsEvent::Error(e) => tracing::debug!("Feed error: {}", e),
        }
    }
    publisher.publish(&windower);
}
