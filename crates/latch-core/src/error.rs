//! Error types for Latch

use thiserror::Error;

use crate::{SubmissionId, SubmissionStatus};

/// Core Latch errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    // Intake errors
    #[error("validation failed: {0}")]
    Validation(String),

    // Lookup errors
    #[error("submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    // Authority errors
    #[error("admin authority required")]
    Unauthorized,

    // State machine errors
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    // Store errors
    #[error("store operation failed: {0}")]
    Store(String),

    // Intake timeout
    #[error("operation timed out")]
    Timeout,
}

impl AccessError {
    pub fn validation(message: impl Into<String>) -> Self {
        AccessError::Validation(message.into())
    }

    /// Whether the caller should retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, AccessError::Store(_) | AccessError::Timeout)
    }
}

/// Result type for Latch operations
pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AccessError::Store("io".into()).is_retryable());
        assert!(AccessError::Timeout.is_retryable());
        assert!(!AccessError::validation("missing proof").is_retryable());
        assert!(!AccessError::Unauthorized.is_retryable());
    }
}
