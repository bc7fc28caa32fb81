use shared::error::ValidationError;
use thiserror::Error;

pub const TRANSPORT_FAILURE: &str = "transport failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The service answered with a non-success status.
    Status(u16),
    /// No response was received.
    Transport,
    /// A success response whose body could not be understood.
    Malformed,
}

/// Failure of a call to the password service. The message is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: ServiceErrorKind,
    message: String,
}

impl ServiceError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Status(status),
            message: message.into(),
        }
    }

    pub fn transport() -> Self {
        Self {
            kind: ServiceErrorKind::Transport,
            message: TRANSPORT_FAILURE.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of an explicit panel action that did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("a request is already in progress")]
    Busy,
    #[error("the bulk generation dialog is not open")]
    ModalClosed,
    /// The input or dialog was cleared while the request was in flight; its
    /// response was dropped.
    #[error("the request was superseded before its response arrived")]
    Superseded,
}

impl PanelError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PanelError::Validation(_))
    }
}
