//! Rate limiter configuration.

use serde::{Deserialize, Serialize};

/// Token-bucket rate limiter configuration.
///
/// `burst` is the bucket capacity (maximum requests served back-to-back),
/// `rate_per_second` the sustained refill rate. Idle buckets are removed
/// by a background sweep to bound memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum tokens per bucket.
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Token refill rate per second.
    #[serde(default = "default_rate")]
    pub rate_per_second: f64,
    /// Interval between sweeps of idle buckets, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Buckets idle for longer than this are removed, in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: default_burst(),
            rate_per_second: default_rate(),
            sweep_interval_seconds: default_sweep_interval(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

fn default_burst() -> u32 {
    100
}

fn default_rate() -> f64 {
    10.0
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    600
}
