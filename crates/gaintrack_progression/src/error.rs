//! Error types for the progression service and its servers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("repository error: {0}")]
    Repository(#[from] gaintrack_client::RepositoryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProgressionError> for String {
    fn from(err: ProgressionError) -> Self {
        err.to_string()
    }
}

/// Result type alias for progression operations.
pub type ProgressionResult<T> = Result<T, ProgressionError>;
