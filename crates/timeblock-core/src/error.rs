//! Domain error taxonomy.

use thiserror::Error;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors produced by the scheduling core.
///
/// Every variant maps to a client-facing failure; none of these are
/// retried. [`DomainError::Conflict`] carries the id of the stored event
/// the candidate window collided with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The candidate window overlaps a stored event.
    #[error("event overlaps existing event {conflicting_id}")]
    Conflict { conflicting_id: i64 },

    /// No event exists with the given id.
    #[error("event {id} not found")]
    NotFound { id: i64 },

    /// Unsupported statistics output format.
    #[error("unsupported statistics format: {format}")]
    InvalidFormat { format: String },
}

impl DomainError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error naming the colliding event.
    pub fn conflict(conflicting_id: i64) -> Self {
        Self::Conflict { conflicting_id }
    }

    /// Creates a not-found error for the given id.
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Creates an invalid-format error.
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
        }
    }
}
