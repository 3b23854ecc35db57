//! JIA Executor Error Types

use jia_core::JiaError;
use jia_store::StoreError;
use thiserror::Error;

/// JIA Executor Result type
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// JIA Executor Error
///
/// Domain errors pass through unmodified so the coded message
/// (`[JIA-APPR-002]` and friends) survives to the API boundary.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Domain rule rejected the operation; the aggregate is unchanged
    #[error(transparent)]
    Domain(#[from] JiaError),

    /// Not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Duplicate aggregate id
    #[error("{entity_type} already exists: {id}")]
    Duplicate { entity_type: String, id: String },

    /// Party registry error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ExecutorError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a registry error
    pub fn registry(reason: impl Into<String>) -> Self {
        Self::Registry(reason.into())
    }

    /// Stable domain error code, if this wraps a coded domain error
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Domain(err) => err.code(),
            _ => None,
        }
    }
}

impl From<StoreError> for ExecutorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(domain) => Self::Domain(domain),
            StoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            StoreError::Duplicate { entity_type, id } => Self::Duplicate { entity_type, id },
            other => Self::Storage(other.to_string()),
        }
    }
}
