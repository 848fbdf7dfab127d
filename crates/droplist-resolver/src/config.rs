//! Resolver configuration types.

use std::time::Duration;

/// Retry policy for transient resolution failures.
///
/// Kept separate from the concurrency machinery so the same policy can be
/// driven by whatever scheduler executes the attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total attempts = retries + 1).
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,

    /// Ceiling for the computed backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for a zero-based attempt number.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let millis = u64::try_from(self.base_delay.as_millis())
            .unwrap_or(u64::MAX)
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Configuration for a [`crate::Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum lookups in flight at once.
    pub max_concurrency: usize,

    /// Per-attempt timeout ceiling.
    pub attempt_timeout: Duration,

    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 100,
            attempt_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

impl ResolverConfig {
    /// Set the concurrency width.
    #[must_use]
    pub const fn max_concurrency(mut self, width: usize) -> Self {
        self.max_concurrency = width;
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(10), Duration::from_secs(2));
    }

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_concurrency, 100);
        assert_eq!(config.attempt_timeout, Duration::from_secs(3));
        assert_eq!(config.retry.max_retries, 2);
    }
}
