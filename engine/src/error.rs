use storage::StorageError;
use thiserror::Error;

/// Every command either commits fully or fails with one of these kinds.
/// `Unavailable` marks a storage-layer fault and is the only kind a caller
/// may retry without re-fetching state first.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Capacity: {0}")]
    Capacity(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::RowNotFound(what) => EngineError::NotFound(what),
            other => EngineError::Unavailable(other.to_string()),
        }
    }
}
