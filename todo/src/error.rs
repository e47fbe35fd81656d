//! Typed failures surfaced by the workflow.

use crate::session::SessionError;
use crate::validation::FieldErrors;
use thiserror::Error;
use todo_workflow_client::ApiError;

/// Failure of a workflow operation
///
/// Cloneable so it can travel inside actions and be kept in state as the
/// last error shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Form input rejected before any request was made
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Network or transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Token rejected by the backend
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend answered with a status the operation does not accept
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Target todo has no `documentId`, so it cannot be addressed
    #[error("Todo {0} has no document id")]
    MissingDocumentId(u64),

    /// Session could not be read or written
    #[error("Session error: {0}")]
    Session(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<ApiError> for WorkflowError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::RequestFailed(message) => Self::Transport(message),
            ApiError::ResponseParseFailed(message) => Self::Decode(message),
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::UnexpectedStatus { status, message } => {
                Self::UnexpectedStatus { status, message }
            },
        }
    }
}

impl From<SessionError> for WorkflowError {
    fn from(error: SessionError) -> Self {
        Self::Session(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_workflow_errors() {
        assert_eq!(
            WorkflowError::from(ApiError::RequestFailed("refused".into())),
            WorkflowError::Transport("refused".into())
        );
        assert_eq!(
            WorkflowError::from(ApiError::Unauthorized),
            WorkflowError::Unauthorized
        );
        assert_eq!(
            WorkflowError::from(ApiError::UnexpectedStatus {
                status: 500,
                message: "boom".into()
            }),
            WorkflowError::UnexpectedStatus {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn validation_error_display_counts_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), "too short".into());
        assert_eq!(
            WorkflowError::Validation(errors).to_string(),
            "Validation failed for 1 field(s)"
        );
    }
}
