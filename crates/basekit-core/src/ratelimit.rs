//! Per-key token bucket rate limiter with background expiry.
//!
//! Each key (typically a client address) owns one bucket. A bucket starts
//! at `burst` tokens, refills at `rate_per_second`, and every allowed
//! request consumes one token. A background sweep removes buckets idle
//! past `idle_timeout` to bound memory.
//!
//! This is an approximate, single-process limiter: multiple instances of
//! the service do not share bucket state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval};
use tracing::debug;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// In-memory token bucket rate limiter.
///
/// Construction spawns the sweeper task and therefore requires a running
/// tokio runtime; call [`RateLimiter::shutdown`] (or drop the limiter) to
/// stop it.
#[derive(Debug)]
pub struct RateLimiter {
    /// Key → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Token refill rate per second.
    rate: f64,
    /// Maximum tokens per bucket.
    burst: f64,
    /// Buckets idle past this age are swept.
    idle_timeout: Duration,
    sweeper: JoinHandle<()>,
}

impl RateLimiter {
    /// Create a new rate limiter and start its background sweep.
    pub fn new(config: &RateLimitConfig) -> Self {
        let buckets: Arc<Mutex<HashMap<String, TokenBucket>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let idle_timeout = Duration::from_secs(config.idle_timeout_seconds);
        let sweep_interval = Duration::from_secs(config.sweep_interval_seconds.max(1));

        let sweep_buckets = Arc::clone(&buckets);
        let sweeper = tokio::spawn(async move {
            let mut ticker = interval(sweep_interval);
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                Self::sweep_idle(&sweep_buckets, idle_timeout).await;
            }
        });

        Self {
            buckets,
            rate: config.rate_per_second,
            burst: config.burst as f64,
            idle_timeout,
            sweeper,
        }
    }

    /// Attempt to consume a token for the given key.
    ///
    /// Returns `true` when the request is allowed. Refill and consumption
    /// happen in one critical section so concurrent requests for the same
    /// key cannot lose updates between the two steps.
    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        let Some(bucket) = buckets.get_mut(key) else {
            // First request from this key: one token consumed immediately.
            buckets.insert(
                key.to_string(),
                TokenBucket {
                    tokens: self.burst - 1.0,
                    last_refill: now,
                },
            );
            return true;
        };

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens < 1.0 {
            return false;
        }
        bucket.tokens -= 1.0;
        true
    }

    /// Number of keys currently tracked.
    pub async fn active_keys(&self) -> usize {
        self.buckets.lock().await.len()
    }

    /// Remove buckets idle for longer than the configured timeout.
    pub async fn sweep(&self) {
        Self::sweep_idle(&self.buckets, self.idle_timeout).await;
    }

    /// Stop the background sweep task.
    pub fn shutdown(&self) {
        self.sweeper.abort();
    }

    async fn sweep_idle(buckets: &Mutex<HashMap<String, TokenBucket>>, idle_timeout: Duration) {
        let mut buckets = buckets.lock().await;
        let before = buckets.len();
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < idle_timeout);
        let swept = before - buckets.len();
        if swept > 0 {
            debug!(swept, remaining = buckets.len(), "Swept idle rate-limit buckets");
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(burst: u32, rate: f64) -> RateLimitConfig {
        RateLimitConfig {
            burst,
            rate_per_second: rate,
            sweep_interval_seconds: 300,
            idle_timeout_seconds: 600,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_exhaustion_and_refill() {
        let limiter = RateLimiter::new(&config(10, 1.0));

        for i in 0..10 {
            assert!(limiter.check("10.0.0.1").await, "request {i} within burst");
        }
        assert!(!limiter.check("10.0.0.1").await, "11th request is denied");

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.check("10.0.0.1").await, "one token after 1s");
        assert!(!limiter.check("10.0.0.1").await, "only one token after 1s");

        limiter.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_capped_at_burst() {
        let limiter = RateLimiter::new(&config(3, 1.0));

        for _ in 0..3 {
            assert!(limiter.check("k").await);
        }
        tokio::time::advance(Duration::from_secs(3600)).await;

        for _ in 0..3 {
            assert!(limiter.check("k").await);
        }
        assert!(!limiter.check("k").await);

        limiter.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_isolated() {
        let limiter = RateLimiter::new(&config(1, 0.0));

        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);
        assert!(limiter.check("b").await, "key b has its own bucket");

        limiter.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_idle_buckets() {
        let limiter = RateLimiter::new(&config(10, 1.0));

        assert!(limiter.check("stale").await);
        assert_eq!(limiter.active_keys().await, 1);

        tokio::time::advance(Duration::from_secs(601)).await;
        limiter.sweep().await;
        assert_eq!(limiter.active_keys().await, 0);

        limiter.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_active_buckets() {
        let limiter = RateLimiter::new(&config(10, 1.0));

        assert!(limiter.check("fresh").await);
        tokio::time::advance(Duration::from_secs(10)).await;
        limiter.sweep().await;
        assert_eq!(limiter.active_keys().await, 1);

        limiter.shutdown();
    }
}
