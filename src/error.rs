// SPDX-License-Identifier: Apache-2.0
//! Error types for the lead relay

use thiserror::Error;

/// Failures while signing or delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook rejected request with status {status}")]
    Rejected { status: u16 },
}

/// Outcome of a customer submission that did not end in a sent notification.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Daily submission limit of {limit} reached for {identifier}")]
    RateLimited { identifier: String, limit: u32 },

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl LeadError {
    /// Status code carried inside the uniform response body.
    pub fn code(&self) -> u16 {
        match self {
            LeadError::RateLimited { .. } => 401,
            LeadError::Notify(_) => 500,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LeadError>;
