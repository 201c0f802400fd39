// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for submissions and webhook deliveries.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label values for `lead_submissions_total`.
pub mod outcome {
    pub const SENT: &str = "sent";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const NOTIFY_FAILED: &str = "notify_failed";
    pub const INVALID: &str = "invalid";
}

/// Service metrics on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    notifications: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("lead_submissions_total", "Customer lead submissions by outcome"),
            &["outcome"],
        )?;
        let notifications = IntCounterVec::new(
            Opts::new("notifications_sent_total", "Webhook notifications by result"),
            &["result"],
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(notifications.clone()))?;

        Ok(Self {
            registry,
            submissions,
            notifications,
        })
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn record_notification(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.notifications.with_label_values(&[result]).inc();
    }

    /// Current count for a submission outcome.
    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render() {
        let metrics = Metrics::new().unwrap();
        metrics.record_submission(outcome::SENT);
        metrics.record_submission(outcome::SENT);
        metrics.record_submission(outcome::RATE_LIMITED);
        metrics.record_notification(true);

        assert_eq!(metrics.submissions(outcome::SENT), 2);
        assert_eq!(metrics.submissions(outcome::RATE_LIMITED), 1);

        let text = metrics.render().unwrap();
        assert!(text.contains("lead_submissions_total{outcome=\"sent\"} 2"));
        assert!(text.contains("notifications_sent_total{result=\"success\"} 1"));
    }
}
