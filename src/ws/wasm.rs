//! WASM WebSocket client using `web-sys::WebSocket`.
//!
//! - `web-sys::WebSocket` + `wasm-bindgen` closures
//! - Unconditional reconnection via `gloo-timers` (immediate after a drop,
//!   paced after a failed attempt or a connection that closed before any
//!   message)
//! - Callback-based event delivery (`on_event: impl Fn(WsEvent)`)
//!
//! State lives in the instance (`Rc<RefCell<_>>`), so several charts can run
//! side by side. Socket callbacks hold only a `Weak` reference; dropping the
//! client closes the socket and cancels any pending reconnect.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crate::error::WsError;
use crate::ws::{ReadyState, Rotation, WsConfig, WsEvent};

const NORMAL_CLOSURE: u16 = 1000;

type EventCallback = Rc<dyn Fn(WsEvent)>;

/// Callbacks attached to one socket. Owned by the client and rotated with
/// the socket, never dropped from inside one of their own calls.
struct Handlers {
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(ErrorEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

struct Inner {
    config: WsConfig,
    ws: Option<WebSocket>,
    handlers: Rotation<Handlers>,
    on_event: Option<EventCallback>,
    /// Pending reconnect; a fired timer is retired by its own callback.
    reconnect_timeout: Rotation<Timeout>,
    /// The current socket delivered at least one message.
    delivered: bool,
    /// `close()` was called; nothing reconnects.
    closed_by_owner: bool,
}

impl Inner {
    fn retire_socket(&mut self) {
        if let Some(ws) = self.ws.take() {
            detach(&ws);
        }
        self.handlers.retire();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.reconnect_timeout.cancel();
        if let Some(ws) = self.ws.take() {
            detach(&ws);
            let _ = ws.close_with_code(NORMAL_CLOSURE);
        }
    }
}

/// WASM WebSocket client.
pub struct WsClient {
    inner: Rc<RefCell<Inner>>,
}

impl WsClient {
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                ws: None,
                handlers: Rotation::new(),
                on_event: None,
                reconnect_timeout: Rotation::new(),
                delivered: false,
                closed_by_owner: false,
            })),
        }
    }

    /// Open the connection. `on_event` receives every connection event and
    /// message until [`WsClient::close`] is called. Fails only for a URL
    /// that can never connect.
    pub fn connect(&self, on_event: impl Fn(WsEvent) + 'static) -> Result<(), WsError> {
        {
            let mut inner = self.inner.borrow_mut();
            inner.config.validate()?;
            inner.on_event = Some(Rc::new(on_event));
            inner.closed_by_owner = false;
        }
        do_connect(&self.inner);
        Ok(())
    }

    /// Close the connection. No reconnect follows.
    pub fn close(&self) {
        let ws = {
            let mut inner = self.inner.borrow_mut();
            inner.closed_by_owner = true;
            inner.reconnect_timeout.cancel();
            let ws = inner.ws.clone();
            inner.retire_socket();
            ws
        };
        if let Some(ws) = ws {
            if let Err(e) = ws.close_with_code(NORMAL_CLOSURE) {
                tracing::warn!("Failed to close WebSocket: {}", extract_js_error(&e));
            }
        }
        tracing::info!("WebSocket closed by owner");
    }

    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner
            .try_borrow()
            .ok()
            .and_then(|inner| inner.ws.as_ref().map(|w| ReadyState::from(w.ready_state())))
            .unwrap_or(ReadyState::Closed)
    }

    pub fn config(&self) -> WsConfig {
        self.inner.borrow().config.clone()
    }
}

// ─── Internal ────────────────────────────────────────────────────────────────

/// Deliver an event without holding the borrow, so the callback may call
/// back into the client.
fn emit(inner: &Rc<RefCell<Inner>>, event: WsEvent) {
    let callback = inner.borrow().on_event.clone();
    if let Some(f) = callback {
        f(event);
    }
}

fn do_connect(inner: &Rc<RefCell<Inner>>) {
    let url = {
        let state = inner.borrow();
        if state.closed_by_owner {
            return;
        }
        if let Some(ws) = state.ws.as_ref() {
            if matches!(
                ReadyState::from(ws.ready_state()),
                ReadyState::Connecting | ReadyState::Open
            ) {
                tracing::info!("Already connected or connecting, skipping");
                return;
            }
        }
        state.config.url.clone()
    };

    tracing::info!("Connecting to {}", url);

    match WebSocket::new(&url) {
        Err(err) => {
            let msg = extract_js_error(&err);
            tracing::error!("Failed to create WebSocket: {}", msg);
            emit(inner, WsEvent::Error(format!("Failed to create WebSocket: {}", msg)));
            let delay = inner.borrow().config.reconnect_delay_ms;
            schedule_reconnect(inner, delay);
        }
        Ok(ws) => setup_connection(inner, ws),
    }
}

fn setup_connection(inner: &Rc<RefCell<Inner>>, ws: WebSocket) {
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(inner);

    let onopen = Closure::<dyn FnMut()>::new({
        let weak = weak.clone();
        move || {
            let Some(inner) = weak.upgrade() else { return };
            tracing::info!("WebSocket opened");
            emit(&inner, WsEvent::Connected);
        }
    });
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

    let onmessage = Closure::<dyn FnMut(MessageEvent)>::new({
        let weak = weak.clone();
        move |e: MessageEvent| {
            let Some(inner) = weak.upgrade() else { return };
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                inner.borrow_mut().delivered = true;
                emit(&inner, WsEvent::Message(txt.into()));
            }
        }
    });
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

    let onerror = Closure::<dyn FnMut(ErrorEvent)>::new({
        let weak = weak.clone();
        move |e: ErrorEvent| {
            let Some(inner) = weak.upgrade() else { return };
            let msg = extract_js_error(&e.error());
            tracing::error!("WebSocket error: {}", msg);
            emit(&inner, WsEvent::Error(msg));
        }
    });
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |e: CloseEvent| {
        let Some(inner) = weak.upgrade() else { return };
        let code = e.code();
        let reason = e.reason();
        tracing::info!("WebSocket closed: code={}, reason={}", code, reason);

        let (reconnect, delay) = {
            let mut state = inner.borrow_mut();
            state.retire_socket();
            // Immediate after a connection that carried data, paced otherwise.
            let delay = if state.delivered {
                0
            } else {
                state.config.reconnect_delay_ms
            };
            state.delivered = false;
            (state.config.reconnect && !state.closed_by_owner, delay)
        };

        emit(
            &inner,
            WsEvent::Disconnected {
                code: Some(code),
                reason,
            },
        );

        if reconnect {
            schedule_reconnect(&inner, delay);
        }
    });
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

    let mut state = inner.borrow_mut();
    if let Some(old) = state.ws.take() {
        detach(&old);
    }
    state.handlers.install(Handlers {
        _onopen: onopen,
        _onmessage: onmessage,
        _onerror: onerror,
        _onclose: onclose,
    });
    state.delivered = false;
    state.ws = Some(ws);
}

fn schedule_reconnect(inner: &Rc<RefCell<Inner>>, delay_ms: u64) {
    let mut state = inner.borrow_mut();
    if state.closed_by_owner {
        return;
    }
    if state.reconnect_timeout.is_active() {
        tracing::debug!("Reconnect already scheduled, skipping");
        return;
    }

    tracing::info!("Scheduling reconnect in {}ms", delay_ms);
    let weak = Rc::downgrade(inner);
    let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
    state.reconnect_timeout.install(Timeout::new(delay, move || {
        let Some(inner) = weak.upgrade() else { return };
        inner.borrow_mut().reconnect_timeout.retire();
        do_connect(&inner);
    }));
}

fn detach(ws: &WebSocket) {
    ws.set_onopen(None);
    ws.set_onmessage(None);
    ws.set_onerror(None);
    ws.set_onclose(None);
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn extract_js_error(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        let name = error.name().as_string().unwrap_or_else(|| "Error".to_string());
        let message = error.message().as_string().unwrap_or_default();
        return if message.is_empty() {
            name
        } else {
            format!("{}: {}", name, message)
        };
    }

    if let Some(s) = err.as_string().filter(|s| !s.is_empty()) {
        return s;
    }

    if err.is_undefined() || err.is_null() {
        return "WebSocket error".to_string();
    }

    js_sys::JSON::stringify(err)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "Unknown WebSocket error".to_string())
}
