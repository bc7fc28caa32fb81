use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback shown when a failed response carries no `error` field.
pub const GENERIC_API_ERROR: &str = "API request failed";

/// Error body returned by the password service on non-success statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    pub fn message_or_generic(&self) -> String {
        match self.error.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => GENERIC_API_ERROR.to_string(),
        }
    }
}

/// Locally detected input problems; these never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one character set")]
    NoCharacterSet,
    #[error("Length must be between 1 and 128 (got {length})")]
    LengthOutOfRange { length: u32 },
    #[error("Count must be between 1 and 50")]
    BulkCountOutOfRange { count: u32 },
    #[error("Please enter a password to analyze")]
    EmptyPassword,
}
