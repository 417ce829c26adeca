//! Application error types for the doc cache and its collaborators.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A disk operation failed; the cache phase is skipped.
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The cache is not in the `Ready` state.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Tree and index disagree. Always a bug in an earlier mutation.
    #[error("Cache inconsistency: {0}")]
    CacheInconsistency(String),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

impl AppError {
    pub(crate) fn inconsistency(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("[DocCache] {}", message);
        Self::CacheInconsistency(message)
    }
}
