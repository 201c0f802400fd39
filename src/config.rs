// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the lead relay.
//!
//! Everything is read once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the lead relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// DingTalk robot configuration
    pub dingtalk: DingTalkConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// DingTalk custom robot settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct DingTalkConfig {
    /// Robot webhook URL, including its `access_token` query parameter
    pub webhook_url: String,

    /// Shared secret used to sign outbound requests
    pub secret: String,
}

// The secret stays out of logs.
impl std::fmt::Debug for DingTalkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DingTalkConfig")
            .field("webhook_url", &self.webhook_url)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Per-phone rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per phone number per calendar day (default: 10)
    #[serde(default = "default_max_daily_usage")]
    pub max_daily_usage: u32,

    /// How often stale usage entries from previous days are evicted (default: 3600)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Validation configuration for customer submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accepted mobile number pattern (default: `^1[3-9][0-9]{9}$`)
    ///
    /// Use explicit `[0-9]` classes: `\d` in `regex` matches any Unicode digit.
    #[serde(default = "default_phone_pattern")]
    pub phone_pattern: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_daily_usage() -> u32 {
    10
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_phone_pattern() -> String {
    r"^1[3-9][0-9]{9}$".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_daily_usage: default_max_daily_usage(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            phone_pattern: default_phone_pattern(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the cleanup interval, never shorter than one second
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl Config {
    /// Build a configuration with defaults around the given DingTalk settings.
    pub fn new(dingtalk: DingTalkConfig) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            dingtalk,
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }

    /// Load configuration from process environment variables.
    ///
    /// - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
    /// - `DINGTALK_WEBHOOK_URL`: Robot webhook URL (required)
    /// - `DINGTALK_SECRET`: Robot signing secret (required)
    /// - `MAX_DAILY_USAGE`: Submissions per phone per day (default: 10)
    /// - `CLEANUP_INTERVAL_SECS`: Stale usage eviction interval (default: 3600)
    /// - `METRICS_ENABLED`: Expose `/metrics` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = required(&lookup, "DINGTALK_WEBHOOK_URL")?;
        match Url::parse(&webhook_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Invalid {
                    var: "DINGTALK_WEBHOOK_URL",
                    value: webhook_url,
                })
            }
        }
        let secret = required(&lookup, "DINGTALK_SECRET")?;

        let mut config = Config::new(DingTalkConfig {
            webhook_url,
            secret,
        });

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = parsed(&lookup, "MAX_DAILY_USAGE")? {
            config.rate_limit.max_daily_usage = v;
        }
        if let Some(v) = parsed(&lookup, "CLEANUP_INTERVAL_SECS")? {
            config.rate_limit.cleanup_interval_secs = v;
        }
        if let Some(v) = parsed(&lookup, "METRICS_ENABLED")? {
            config.metrics.enabled = v;
        }

        Ok(config)
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
