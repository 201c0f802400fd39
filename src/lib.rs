// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Lead Relay
//!
//! Accepts customer lead submissions and forwards them to a DingTalk
//! custom robot:
//!
//! - Required-field and mobile number validation
//! - Per-phone daily submission limit (10 per calendar day default)
//! - HMAC-SHA256 signed webhook delivery
//! - Uniform `{code, success, errorMessage}` responses

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod service;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::{LeadError, NotifyError};
pub use limiter::{RateLimitResult, RateLimiter};
pub use notifier::{DingTalkNotifier, Notifier};
pub use service::LeadService;
pub use store::{InMemoryUsageStore, UsageKey, UsageStore};
pub use validator::{LeadValidator, ValidationResult};
