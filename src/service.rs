// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission pipeline: rate limit, record usage, notify.

use crate::error::{LeadError, Result};
use crate::limiter::RateLimiter;
use crate::metrics::{outcome, Metrics};
use crate::models::CustomerMessage;
use crate::notifier::{format_customer_notification, Notifier};
use std::sync::Arc;
use tracing::{info, warn};

/// Sequences the limiter and the notifier for each submission.
pub struct LeadService {
    limiter: RateLimiter,
    notifier: Arc<dyn Notifier>,
    metrics: Metrics,
}

impl LeadService {
    pub fn new(limiter: RateLimiter, notifier: Arc<dyn Notifier>, metrics: Metrics) -> Self {
        Self {
            limiter,
            notifier,
            metrics,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Forward a validated customer lead.
    ///
    /// Usage is recorded before the send, so a failed delivery still counts
    /// toward the daily limit.
    pub async fn submit(&self, msg: &CustomerMessage) -> Result<()> {
        let phone = msg.customer_phone.as_str();

        if !self.limiter.check_limit(phone).await {
            self.metrics.record_submission(outcome::RATE_LIMITED);
            return Err(LeadError::RateLimited {
                identifier: phone.to_string(),
                limit: self.limiter.limit(),
            });
        }

        let count = self.limiter.increment_usage(phone).await;

        let text = format_customer_notification(
            &msg.company_name,
            &msg.customer_name,
            &msg.customer_phone,
            &msg.customer_requirement,
        );

        match self.notifier.send(&text).await {
            Ok(()) => {
                self.metrics.record_notification(true);
                self.metrics.record_submission(outcome::SENT);
                info!(phone, count, "Customer lead forwarded");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_notification(false);
                self.metrics.record_submission(outcome::NOTIFY_FAILED);
                warn!(phone, count, error = %e, "Customer lead not delivered");
                Err(e.into())
            }
        }
    }

    /// Forward free text with no rate limiting. Any failure collapses to `false`.
    pub async fn send_raw(&self, content: &str) -> bool {
        let sent = self.notifier.send(content).await.is_ok();
        self.metrics.record_notification(sent);
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::RateLimitConfig;
    use crate::error::NotifyError;
    use crate::store::InMemoryUsageStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Records sent texts, optionally failing every call.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> std::result::Result<(), NotifyError> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(NotifyError::Rejected { status: 502 })
            } else {
                Ok(())
            }
        }
    }

    fn service(notifier: Arc<RecordingNotifier>) -> LeadService {
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            0,
        ));
        let limiter = RateLimiter::new(
            RateLimitConfig::default(),
            Arc::new(InMemoryUsageStore::new()),
            clock,
        );
        LeadService::new(limiter, notifier, Metrics::new().unwrap())
    }

    fn lead() -> CustomerMessage {
        CustomerMessage {
            company_name: "ACME".to_string(),
            customer_name: "Jane".to_string(),
            customer_phone: "13900000000".to_string(),
            customer_requirement: "needs a quote".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_formatted_text() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service(notifier.clone());

        service.submit(&lead()).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            ["【新客户信息】\n公司名称：ACME\n客户名称：Jane\n客户电话：13900000000\n客户需求：needs a quote"]
        );
        assert_eq!(service.metrics().submissions(outcome::SENT), 1);
    }

    #[tokio::test]
    async fn test_tenth_submission_allowed_eleventh_limited() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service(notifier.clone());
        let phone = "13900000000";

        for _ in 0..9 {
            service.limiter().increment_usage(phone).await;
        }

        service.submit(&lead()).await.unwrap();
        assert_eq!(service.limiter().usage_count(phone).await, 10);

        let err = service.submit(&lead()).await.unwrap_err();
        assert!(matches!(err, LeadError::RateLimited { limit: 10, .. }));
        assert_eq!(err.code(), 401);
        assert_eq!(service.limiter().usage_count(phone).await, 10);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_still_counts() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let service = service(notifier);

        let err = service.submit(&lead()).await.unwrap_err();
        assert!(matches!(err, LeadError::Notify(NotifyError::Rejected { status: 502 })));
        assert_eq!(err.code(), 500);
        assert_eq!(service.limiter().usage_count("13900000000").await, 1);
        assert_eq!(service.metrics().submissions(outcome::NOTIFY_FAILED), 1);
    }

    #[tokio::test]
    async fn test_send_raw_bypasses_limit() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service(notifier.clone());

        for _ in 0..12 {
            assert!(service.send_raw("ping").await);
        }
        assert_eq!(notifier.sent.lock().unwrap().len(), 12);
        assert_eq!(service.limiter().usage_count("ping").await, 0);
    }

    #[tokio::test]
    async fn test_send_raw_collapses_failure() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        assert!(!service(notifier).send_raw("ping").await);
    }
}
