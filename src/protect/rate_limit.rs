//! Fixed-window rate limiting keyed by client identity.
//!
//! # Design Decisions
//! - Fixed window, not token bucket: the limit/remaining pair the wrapped
//!   API publishes maps directly onto a window counter
//! - Windows roll over atomically on expiry with no partial carryover
//! - State is sharded by key (dashmap); contention stays flat as client
//!   cardinality grows

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a rate-limit check, surfaced on 429 bodies and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
}

struct Window {
    count: u64,
    started: Instant,
}

/// Per-client fixed-window counter store.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u64,
    window: Duration,
}

// Eviction sweeps start once the map holds this many clients.
const EVICTION_THRESHOLD: usize = 1024;

impl RateLimiter {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Count one request for `key` against the current window.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        self.maybe_evict(now);

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                count: 0,
                started: now,
            });

        if now.duration_since(entry.started) > self.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count < self.limit {
            entry.count += 1;
            RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - entry.count,
            }
        } else {
            RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
            }
        }
    }

    /// Drop windows idle for more than twice the window duration. Runs
    /// opportunistically; memory stays bounded without a sweeper task.
    fn maybe_evict(&self, now: Instant) {
        if self.windows.len() > EVICTION_THRESHOLD {
            let horizon = self.window * 2;
            self.windows
                .retain(|_, w| now.duration_since(w.started) <= horizon);
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}
