//! Retry policies for HTTP requests.

use std::time::Duration;

/// Retry policy for an HTTP request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    None,
    /// Retry on transport failures and 429/5xx gateway errors with
    /// exponential backoff. Every endpoint here is a GET, so this is the
    /// default.
    #[default]
    Idempotent,
    /// Caller-provided backoff.
    Custom(RetryConfig),
}

/// Backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Spread each delay by ±25%.
    pub jitter: bool,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    /// Backoff used by [`RetryPolicy::Idempotent`].
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let spread = capped * 0.25;
            (capped + (rand::random::<f64>() - 0.5) * 2.0 * spread).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_retries_gets() {
        assert!(matches!(RetryPolicy::default(), RetryPolicy::Idempotent));
        assert_eq!(RetryConfig::default(), RetryConfig::idempotent());
    }

    #[test]
    fn test_idempotent_statuses() {
        let config = RetryConfig::idempotent();
        for status in [429, 502, 503, 504] {
            assert!(config.retryable_statuses.contains(&status));
        }
        assert!(!config.retryable_statuses.contains(&400));
    }

    #[test]
    fn test_exponential_backoff() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            ..RetryConfig::idempotent()
        }
        .without_jitter();
        let delays: Vec<u128> = (0..3).map(|a| config.delay_for_attempt(a).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400]);
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(2000),
            backoff_factor: 10.0,
            ..RetryConfig::idempotent()
        }
        .without_jitter()
        .with_max_retries(5);
        assert_eq!(config.delay_for_attempt(3).as_millis(), 2000);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig::idempotent();
        for _ in 0..50 {
            let ms = config.delay_for_attempt(0).as_millis();
            assert!((150..=250).contains(&ms), "{}", ms);
        }
    }
}
