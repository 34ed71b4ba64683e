use thiserror::Error;
use validator::ValidationErrors;

use crate::state::FoldError;

/// Errors raised while turning a wire message into a session event.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message is not valid JSON or does not match any event shape.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// The message parsed but its payload failed validation.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),
    /// The message carries a tag outside the event catalog.
    #[error("unknown event type")]
    UnknownEvent,
}

/// Errors surfaced by the session driver.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The driver task has stopped.
    #[error("session driver is not running")]
    Closed,
    /// The event was dropped by the fold.
    #[error("event rejected: {0}")]
    Rejected(#[from] FoldError),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<DecodeError> for ServiceError {
    fn from(err: DecodeError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}
