use thiserror::Error;

/// Main error type for shoal operations
#[derive(Error, Debug)]
pub enum ShoalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Worker pool is shut down")]
    PoolClosed,

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for shoal operations
pub type Result<T> = std::result::Result<T, ShoalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShoalError::InvalidRequest("dataset_path_required".to_string());
        assert_eq!(err.to_string(), "Invalid request: dataset_path_required");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ShoalError = io.into();
        assert!(matches!(err, ShoalError::Io(_)));
    }
}
