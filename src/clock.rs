// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Time sources for usage keys and signing timestamps.
//!
//! `SystemClock` is used in production. `FixedClock` lets tests pin the
//! calendar day and the signing timestamp.

use chrono::{Local, NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// Source of the current calendar day and epoch milliseconds.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current calendar date in the process-local timezone.
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually controlled clock.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(today: NaiveDate, millis: i64) -> Self {
        Self {
            today: RwLock::new(today),
            millis: AtomicI64::new(millis),
        }
    }

    /// Move the calendar date.
    pub fn set_today(&self, today: NaiveDate) {
        // A poisoned lock only means a writer panicked mid-assignment of a Copy value.
        let mut guard = self.today.write().unwrap_or_else(|e| e.into_inner());
        *guard = today;
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.read().unwrap_or_else(|e| e.into_inner())
    }

    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}
