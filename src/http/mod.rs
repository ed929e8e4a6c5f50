//! HTTP client layer: `ChartHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::ChartHttp;
pub use retry::{RetryConfig, RetryPolicy};
