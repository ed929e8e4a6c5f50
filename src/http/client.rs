//! Low-level HTTP client for the bootstrap snapshot.
//!
//! One method per endpoint. Returns wire types; conversion to domain types
//! happens in the `domain::price` sub-client.

use crate::domain::price::wire::RestKline;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::{Interval, SymbolPair};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Low-level HTTP client for the market-data REST API.
#[derive(Clone)]
pub struct ChartHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl ChartHttp {
    pub fn new(base_url: &str) -> Self {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::Idempotent,
        }
    }

    /// Override the retry policy used for every GET.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Klines ───────────────────────────────────────────────────────────

    pub(crate) fn klines_url(
        &self,
        pair: &SymbolPair,
        interval: Interval,
        limit: Option<u32>,
    ) -> String {
        let mut url = format!(
            "{}/api/v3/klines?symbol={}&interval={}",
            self.base_url,
            urlencoding::encode(&pair.rest_symbol()),
            interval.as_str()
        );
        if let Some(l) = limit {
            url = format!("{}&limit={}", url, l);
        }
        url
    }

    /// Historical klines for `pair`, oldest first.
    pub async fn get_klines(
        &self,
        pair: &SymbolPair,
        interval: Interval,
        limit: Option<u32>,
    ) -> Result<Vec<RestKline>, HttpError> {
        let url = self.klines_url(pair, interval, limit);
        self.get(&url, self.retry.clone()).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_get(url).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut attempt = 0;
        loop {
            let e = match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };

            let should_retry = match &e {
                HttpError::ServerError { status, .. } => config.retryable_statuses.contains(status),
                HttpError::RateLimited { .. } | HttpError::Timeout => true,
                HttpError::Reqwest(re) => {
                    #[cfg(not(target_arch = "wasm32"))]
                    let retryable = re.is_connect() || re.is_request();
                    #[cfg(target_arch = "wasm32")]
                    let retryable = re.is_request();
                    retryable
                }
                _ => false,
            };
            if !should_retry {
                return Err(e);
            }
            if attempt >= config.max_retries {
                return Err(HttpError::MaxRetriesExceeded {
                    attempts: attempt + 1,
                    last_error: e.to_string(),
                });
            }

            // The server's Retry-After wins over the backoff schedule.
            let delay = match &e {
                HttpError::RateLimited {
                    retry_after_ms: Some(ms),
                } => Duration::from_millis(*ms),
                _ => config.delay_for_attempt(attempt),
            };
            tracing::debug!(
                attempt = attempt + 1,
                max = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Retrying request to {}: {}",
                url,
                e
            );
            futures_timer::Delay::new(delay).await;
            attempt += 1;
        }
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let retry_after_ms = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            // 418 is the feed's "banned after ignoring 429" response.
            429 | 418 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}
