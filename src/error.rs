//! Unified error types.
//!
//! Nothing here is fatal to a running chart: the stream windower maps every
//! failure to "no mutation" and the renderer to "minimal scene". These types
//! exist so the edges (HTTP bootstrap, WS transport, parsing) can report what
//! went wrong to the diagnostic sink before degrading.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ChartError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        ChartError::Parse(msg.into())
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    /// Every attempt failed with a retryable error.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// WebSocket errors.
///
/// Transport failures after `connect` are not errors: they surface as
/// [`crate::ws::WsEvent`]s and are retried.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WsError {
    /// No connection attempt could succeed with this URL.
    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),
}
