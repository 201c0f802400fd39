// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Signed DingTalk robot notifications.
//!
//! Every send computes a fresh timestamp and signature:
//!
//! ```text
//! sign = urlencode(base64(HMAC-SHA256(key = secret, "{timestamp}\n{secret}")))
//! url  = {webhook_url}&timestamp={timestamp}&sign={sign}
//! ```

use crate::clock::Clock;
use crate::config::DingTalkConfig;
use crate::error::NotifyError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::{header, Client};
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, error, info};

type HmacSha256 = Hmac<Sha256>;

/// Delivers a text notification somewhere.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Robot message body: `{"msgtype":"text","text":{"content":...}}`.
#[derive(Debug, Serialize)]
pub struct TextMessage<'a> {
    msgtype: &'static str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

impl<'a> TextMessage<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            msgtype: "text",
            text: TextContent { content },
        }
    }
}

/// Compute the URL-safe signature for one request.
pub fn compute_signature(secret: &str, timestamp_ms: i64) -> Result<String, NotifyError> {
    let string_to_sign = format!("{}\n{}", timestamp_ms, secret);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| NotifyError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());

    let encoded = STANDARD.encode(mac.finalize().into_bytes());
    Ok(urlencoding::encode(&encoded).into_owned())
}

/// Append the timestamp and signature to a webhook URL that already has a query string.
pub fn build_url(base_webhook_url: &str, timestamp_ms: i64, signature: &str) -> String {
    format!(
        "{}&timestamp={}&sign={}",
        base_webhook_url, timestamp_ms, signature
    )
}

/// Render a customer lead as the robot message text.
pub fn format_customer_notification(
    company_name: &str,
    customer_name: &str,
    customer_phone: &str,
    customer_requirement: &str,
) -> String {
    format!(
        "【新客户信息】\n公司名称：{}\n客户名称：{}\n客户电话：{}\n客户需求：{}",
        company_name, customer_name, customer_phone, customer_requirement
    )
}

/// DingTalk custom robot client.
pub struct DingTalkNotifier {
    config: DingTalkConfig,
    http_client: Client,
    clock: Arc<dyn Clock>,
}

impl DingTalkNotifier {
    pub fn new(config: DingTalkConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_client(config, Client::new(), clock)
    }

    pub fn with_client(config: DingTalkConfig, http_client: Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            http_client,
            clock,
        }
    }

    /// Signed URL for a request made at `timestamp_ms`.
    pub fn signed_url(&self, timestamp_ms: i64) -> Result<String, NotifyError> {
        let sign = compute_signature(&self.config.secret, timestamp_ms)?;
        Ok(build_url(&self.config.webhook_url, timestamp_ms, &sign))
    }

    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let timestamp = self.clock.now_millis();
        let url = self.signed_url(timestamp)?;
        let body = serde_json::to_string(&TextMessage::new(text))?;

        let response = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unreadable body>"));
        debug!(status = status.as_u16(), body = %response_body, "Webhook responded");

        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl Notifier for DingTalkNotifier {
    #[tracing::instrument(skip(self, text), fields(len = text.len()))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        match self.deliver(text).await {
            Ok(()) => {
                info!("Notification delivered");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to deliver notification");
                Err(e)
            }
        }
    }
}
