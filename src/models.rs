// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request and response bodies.

use crate::error::LeadError;
use serde::{Deserialize, Deserializer, Serialize};

/// Customer lead submitted by the web form.
///
/// Absent and `null` fields deserialize as empty strings so they surface
/// as validation errors rather than body parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_requirement: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Uniform submission response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub code: u16,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Fixed message returned when a phone number hits its daily limit.
pub const RATE_LIMITED_MESSAGE: &str = "该手机号今日提交次数已达上限，请明天再试";

impl MessageResponse {
    pub fn success() -> Self {
        Self {
            code: 200,
            success: true,
            error_message: None,
        }
    }

    pub fn fail(code: u16, error_message: impl Into<String>) -> Self {
        Self {
            code,
            success: false,
            error_message: Some(error_message.into()),
        }
    }
}

impl From<LeadError> for MessageResponse {
    fn from(err: LeadError) -> Self {
        match &err {
            LeadError::RateLimited { .. } => MessageResponse::fail(err.code(), RATE_LIMITED_MESSAGE),
            LeadError::Notify(inner) => MessageResponse::fail(err.code(), inner.to_string()),
        }
    }
}

impl From<Result<(), LeadError>> for MessageResponse {
    fn from(result: Result<(), LeadError>) -> Self {
        match result {
            Ok(()) => MessageResponse::success(),
            Err(err) => err.into(),
        }
    }
}

/// Query parameters for the plain-text send endpoint.
#[derive(Debug, Deserialize)]
pub struct SendParams {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;

    #[test]
    fn test_success_serializes_null_error() {
        let json = serde_json::to_value(MessageResponse::success()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": 200, "success": true, "errorMessage": null})
        );
    }

    #[test]
    fn test_rate_limited_maps_to_401() {
        let response = MessageResponse::from(LeadError::RateLimited {
            identifier: "13900000000".to_string(),
            limit: 10,
        });
        assert_eq!(response.code, 401);
        assert!(!response.success);
        assert_eq!(response.error_message.as_deref(), Some(RATE_LIMITED_MESSAGE));
    }

    #[test]
    fn test_notify_failure_maps_to_500_with_detail() {
        let response =
            MessageResponse::from(LeadError::Notify(NotifyError::Rejected { status: 503 }));
        assert_eq!(response.code, 500);
        assert_eq!(
            response.error_message.as_deref(),
            Some("Webhook rejected request with status 503")
        );
    }

    #[test]
    fn test_customer_message_missing_fields_default_empty() {
        let msg: CustomerMessage =
            serde_json::from_str(r#"{"companyName":"ACME","customerPhone":"13900000000"}"#)
                .unwrap();
        assert_eq!(msg.company_name, "ACME");
        assert_eq!(msg.customer_name, "");
        assert_eq!(msg.customer_requirement, "");
    }

    #[test]
    fn test_customer_message_null_fields_default_empty() {
        let msg: CustomerMessage = serde_json::from_str(
            r#"{"companyName":null,"customerName":"Jane","customerPhone":null,"customerRequirement":"quote"}"#,
        )
        .unwrap();
        assert_eq!(msg.company_name, "");
        assert_eq!(msg.customer_name, "Jane");
        assert_eq!(msg.customer_phone, "");
    }
}
