use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("File access error: {path}: {message}")]
    FileAccess { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("External service error ({service}): {message}")]
    ExternalService {
        service: String,
        message: String,
        retryable: bool,
    },
    #[error("Index is empty: no chunks have been embedded")]
    EmptyIndex,
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, RagError>;

impl RagError {
    pub fn file_access(path: &Path, err: impl std::fmt::Display) -> Self {
        RagError::FileAccess {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        RagError::Configuration(message.into())
    }

    /// A failure that is not worth retrying (auth, bad request, malformed response).
    pub fn external(service: &str, message: impl std::fmt::Display) -> Self {
        RagError::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
            retryable: false,
        }
    }

    /// A transient failure (network, timeout, rate limit, 5xx).
    pub fn transient(service: &str, message: impl std::fmt::Display) -> Self {
        RagError::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
            retryable: true,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::ExternalService { retryable: true, .. })
    }
}
