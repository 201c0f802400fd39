// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-identifier daily rate limiter.
//!
//! Counts are keyed by `(identifier, local calendar day)`, so a new day
//! starts every identifier at zero without any rollover logic. Entries from
//! earlier days are dropped by [`RateLimiter::cleanup`].
//!
//! Checking and incrementing are separate calls. Concurrent submissions for
//! the same identifier can both pass `check_limit` before either increments,
//! so the stored count may end up above the limit by up to the number of
//! racing callers minus one.

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::store::{UsageKey, UsageStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is allowed
    Allowed {
        /// Submissions already recorded today
        used: u32,
        /// Submissions left today
        remaining: u32,
    },
    /// Daily limit reached
    Limited {
        /// Submissions already recorded today
        used: u32,
        /// Configured daily limit
        limit: u32,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe daily rate limiter.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Usage count storage
    store: Arc<dyn UsageStore>,
    /// Source of the current day
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter over the given store and clock.
    pub fn new(config: RateLimitConfig, store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Configured daily limit.
    pub fn limit(&self) -> u32 {
        self.config.max_daily_usage
    }

    fn key(&self, identifier: &str) -> UsageKey {
        UsageKey::new(identifier, self.clock.today())
    }

    /// Check today's usage for an identifier without recording anything.
    pub async fn check(&self, identifier: &str) -> RateLimitResult {
        let key = self.key(identifier);
        let used = self.store.get(&key).await;
        let limit = self.limit();

        if used >= limit {
            RateLimitResult::Limited { used, limit }
        } else {
            RateLimitResult::Allowed {
                used,
                remaining: limit - used,
            }
        }
    }

    /// Returns `true` while the identifier is under today's limit.
    pub async fn check_limit(&self, identifier: &str) -> bool {
        match self.check(identifier).await {
            RateLimitResult::Allowed { used, remaining } => {
                debug!(identifier, used, remaining, "Within daily limit");
                true
            }
            RateLimitResult::Limited { used, limit } => {
                warn!(identifier, used, limit, "Daily limit reached");
                false
            }
        }
    }

    /// Record one submission and return today's new count.
    pub async fn increment_usage(&self, identifier: &str) -> u32 {
        let key = self.key(identifier);
        let count = self.store.increment(&key).await;
        info!(identifier, count, "Usage recorded");
        count
    }

    /// Today's count for an identifier, 0 if none recorded.
    pub async fn usage_count(&self, identifier: &str) -> u32 {
        self.store.get(&self.key(identifier)).await
    }

    /// Drop usage entries from previous days (should be called periodically).
    pub async fn cleanup(&self) -> usize {
        let today = self.clock.today();
        let removed = self.store.evict_before(today).await;
        if removed > 0 {
            debug!(removed, %today, "Evicted stale usage entries");
        }
        removed
    }
}
