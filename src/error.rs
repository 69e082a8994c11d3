use thiserror::Error;

/// Failure taxonomy for store operations.
///
/// Validation, not-found and already-completed failures never mutate the
/// document. Persistence failures are reported but the in-memory document
/// stays authoritative.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
