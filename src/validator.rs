// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Customer submission validator.
//!
//! - Every field must be present and non-blank
//! - The phone number must match the configured mobile pattern

use crate::config::ValidationConfig;
use crate::models::CustomerMessage;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}不能为空", field_label(.0))]
    Blank(&'static str),

    #[error("手机号格式不正确")]
    InvalidPhone,
}

/// Display name of a submission field.
fn field_label(field: &str) -> &str {
    match field {
        "companyName" => "公司名称",
        "customerName" => "客户名称",
        "customerPhone" => "客户电话",
        "customerRequirement" => "客户需求",
        other => other,
    }
}

impl ValidationError {
    /// JSON field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Blank(field) => *field,
            ValidationError::InvalidPhone => "customerPhone",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Submission is valid
    Valid,
    /// Submission is invalid, one entry per offending field
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    /// Errors keyed by field name, as rendered in a 400 response.
    pub fn field_errors(&self) -> BTreeMap<&'static str, String> {
        self.errors()
            .iter()
            .map(|e| (e.field(), e.to_string()))
            .collect()
    }
}

/// Customer lead validator.
#[derive(Debug, Clone)]
pub struct LeadValidator {
    phone_pattern: Regex,
}

impl LeadValidator {
    /// Create a new validator, compiling the configured phone pattern.
    pub fn new(config: &ValidationConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            phone_pattern: Regex::new(&config.phone_pattern)?,
        })
    }

    /// Check a phone number against the mobile pattern.
    pub fn is_valid_phone(&self, phone: &str) -> bool {
        self.phone_pattern.is_match(phone)
    }

    /// Validate a complete customer submission.
    pub fn validate(&self, msg: &CustomerMessage) -> ValidationResult {
        let mut errors = Vec::new();

        for (field, value) in [
            ("companyName", &msg.company_name),
            ("customerName", &msg.customer_name),
            ("customerPhone", &msg.customer_phone),
            ("customerRequirement", &msg.customer_requirement),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::Blank(field));
            }
        }

        if !msg.customer_phone.trim().is_empty() && !self.is_valid_phone(&msg.customer_phone) {
            debug!(phone = %msg.customer_phone, "Phone number rejected");
            errors.push(ValidationError::InvalidPhone);
        }

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_validator() -> LeadValidator {
        LeadValidator::new(&ValidationConfig::default()).unwrap()
    }

    fn valid_message() -> CustomerMessage {
        CustomerMessage {
            company_name: "ACME".to_string(),
            customer_name: "Jane".to_string(),
            customer_phone: "13900000000".to_string(),
            customer_requirement: "needs a quote".to_string(),
        }
    }

    #[test]
    fn test_valid_message() {
        assert!(default_validator().validate(&valid_message()).is_valid());
    }

    #[test]
    fn test_phone_pattern() {
        let validator = default_validator();

        assert!(validator.is_valid_phone("13900000000"));
        assert!(validator.is_valid_phone("19912345678"));

        assert!(!validator.is_valid_phone("12345"));
        assert!(!validator.is_valid_phone("12900000000"), "second digit must be 3-9");
        assert!(!validator.is_valid_phone("23900000000"), "must start with 1");
        assert!(!validator.is_valid_phone("139000000001"), "12 digits");
        assert!(!validator.is_valid_phone("1390000000a"));
        assert!(!validator.is_valid_phone(" 13900000000"));
    }

    #[test]
    fn test_phone_pattern_rejects_non_ascii_digits() {
        let validator = default_validator();

        // fullwidth and Arabic-Indic zeros would otherwise key a separate daily counter
        assert!(!validator.is_valid_phone("139００００００００"));
        assert!(!validator.is_valid_phone("139０００００００0"));
        assert!(!validator.is_valid_phone("139٠٠٠٠٠٠٠0"));
        assert!(!validator.is_valid_phone("１3900000000"));
    }

    #[test]
    fn test_invalid_phone_reported() {
        let msg = CustomerMessage {
            customer_phone: "12345".to_string(),
            ..valid_message()
        };
        let result = default_validator().validate(&msg);
        assert_eq!(result.errors(), &[ValidationError::InvalidPhone]);
    }

    #[test]
    fn test_blank_fields_all_reported() {
        let msg = CustomerMessage {
            company_name: "  ".to_string(),
            customer_requirement: String::new(),
            ..valid_message()
        };
        let result = default_validator().validate(&msg);
        assert!(!result.is_valid());

        let fields = result.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["companyName"], "公司名称不能为空");
        assert!(fields.contains_key("customerRequirement"));
    }

    #[test]
    fn test_blank_phone_reports_only_blank() {
        let msg = CustomerMessage {
            customer_phone: String::new(),
            ..valid_message()
        };
        let result = default_validator().validate(&msg);
        assert_eq!(result.errors(), &[ValidationError::Blank("customerPhone")]);
    }
}
