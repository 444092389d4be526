//! Error types for tubesync.

use thiserror::Error;

/// Common error type for tubesync.
#[derive(Error, Debug)]
pub enum TubesyncError {
    /// Database error.
    ///
    /// Any failed store operation. Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed request input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The remote subscription source failed or returned a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Fetching or parsing a single channel feed failed.
    ///
    /// Never propagated past the refresh worker.
    #[error("feed error: {0}")]
    Feed(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal failure not caused by input or a collaborator.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for TubesyncError {
    fn from(e: sqlx::Error) -> Self {
        TubesyncError::Database(e.to_string())
    }
}

/// Result type alias for tubesync operations.
pub type Result<T> = std::result::Result<T, TubesyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        let err = TubesyncError::Unauthorized("no token".to_string());
        assert_eq!(err.to_string(), "unauthorized: no token");
    }

    #[test]
    fn test_bad_request_display() {
        let err = TubesyncError::BadRequest("missing provider token".to_string());
        assert_eq!(err.to_string(), "bad request: missing provider token");
    }

    #[test]
    fn test_upstream_display() {
        let err = TubesyncError::Upstream("HTTP 503".to_string());
        assert_eq!(err.to_string(), "upstream error: HTTP 503");
    }

    #[test]
    fn test_not_found_display() {
        let err = TubesyncError::NotFound("channel".to_string());
        assert_eq!(err.to_string(), "channel not found");
    }

    #[test]
    fn test_internal_display() {
        let err = TubesyncError::Internal("refresh worker stopped".to_string());
        assert_eq!(err.to_string(), "internal error: refresh worker stopped");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TubesyncError = io_err.into();
        assert!(matches!(err, TubesyncError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: TubesyncError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, TubesyncError::Database(_)));
    }
}
