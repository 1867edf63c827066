//! Keyed sliding-window rate limiter
//!
//! Pre-pipeline admission gate: a caller identity gets at most `max_calls`
//! within the trailing window. Timestamp pruning is lazy, on every
//! `allow`/`record` call, never on a background schedule. Per-key state
//! lives in a sharded concurrent map; each key's prune-then-read-or-append
//! sequence runs under that key's exclusive entry lock.

use crate::config::RateLimitConfig;
use crate::error::{Error, Result};
use dashmap::DashMap;

/// Sliding-window limiter keyed by caller identity.
pub struct RateLimiter {
    max_calls: usize,
    window_ms: i64,
    /// key -> in-window call timestamps (epoch ms), oldest first
    calls: DashMap<String, Vec<i64>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_calls: config.max_calls,
            window_ms: (config.period_seconds * 1000) as i64,
            calls: DashMap::new(),
        }
    }

    /// Whether the key has remaining capacity in the current window.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, now_ms())
    }

    /// Record a call for the key.
    pub fn record(&self, key: &str) {
        self.record_at(key, now_ms());
    }

    /// Combined admission check: record the call if capacity remains,
    /// otherwise refuse with [`Error::RateLimited`].
    pub fn check(&self, key: &str) -> Result<()> {
        self.check_at(key, now_ms())
    }

    /// Number of in-window calls currently retained for the key.
    pub fn in_window(&self, key: &str) -> usize {
        let now = now_ms();
        self.calls
            .get(key)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|&&t| t > now - self.window_ms)
                    .count()
            })
            .unwrap_or(0)
    }

    fn allow_at(&self, key: &str, now: i64) -> bool {
        let mut entry = self.calls.entry(key.to_string()).or_default();
        let cutoff = now - self.window_ms;
        entry.retain(|&t| t > cutoff);
        entry.len() < self.max_calls
    }

    fn record_at(&self, key: &str, now: i64) {
        let mut entry = self.calls.entry(key.to_string()).or_default();
        let cutoff = now - self.window_ms;
        entry.retain(|&t| t > cutoff);
        entry.push(now);
    }

    fn check_at(&self, key: &str, now: i64) -> Result<()> {
        let mut entry = self.calls.entry(key.to_string()).or_default();
        let cutoff = now - self.window_ms;
        entry.retain(|&t| t > cutoff);
        if entry.len() < self.max_calls {
            entry.push(now);
            Ok(())
        } else {
            tracing::warn!(key = key, "rate limit exceeded");
            Err(Error::RateLimited {
                key: key.to_string(),
            })
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
