//! Error types for the object pool

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    Configuration(String),

    #[error("Pool is exhausted - no free entry and at maximum size")]
    Exhausted,

    #[error("No entry registered under key {0}")]
    NotFound(String),

    #[error("Entry {0} is already borrowed")]
    AlreadyBusy(String),

    #[error("Returned resource does not belong to this pool")]
    UnknownResource,

    #[error("Returned resource is not currently borrowed")]
    NotBorrowed,

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl PoolError {
    /// Whether the failure may clear up once other callers return their loans
    pub fn is_transient(&self) -> bool {
        matches!(self, PoolError::Exhausted | PoolError::AlreadyBusy(_))
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
