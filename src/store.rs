// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Usage count storage.
//!
//! The limiter talks to storage only through [`UsageStore`], so the
//! in-process map can be replaced by a shared key-value cache.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::fmt;

/// A usage counter key: one identifier on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    pub identifier: String,
    pub day: NaiveDate,
}

impl UsageKey {
    pub fn new(identifier: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            identifier: identifier.into(),
            day,
        }
    }
}

/// Renders as `{identifier}_{YYYY-MM-DD}`, the key a shared cache would use.
impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.identifier, self.day)
    }
}

/// Storage backend for per-key usage counts.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Current count, 0 if the key was never incremented.
    async fn get(&self, key: &UsageKey) -> u32;

    /// Atomically add one and return the new count.
    async fn increment(&self, key: &UsageKey) -> u32;

    /// Drop every entry whose day is strictly before `day`.
    async fn evict_before(&self, day: NaiveDate) -> usize;

    /// Number of stored entries.
    async fn entry_count(&self) -> usize;
}

/// Process-local store on a sharded concurrent map.
///
/// Increments for one key hold that key's shard lock for the whole
/// read-modify-write, so concurrent callers always observe distinct counts.
/// Unrelated keys on other shards never contend.
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    counts: DashMap<UsageKey, u32>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn get(&self, key: &UsageKey) -> u32 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    async fn increment(&self, key: &UsageKey) -> u32 {
        let mut count = self.counts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    async fn evict_before(&self, day: NaiveDate) -> usize {
        let before = self.counts.len();
        self.counts.retain(|key, _| key.day >= day);
        before.saturating_sub(self.counts.len())
    }

    async fn entry_count(&self) -> usize {
        self.counts.len()
    }
}
