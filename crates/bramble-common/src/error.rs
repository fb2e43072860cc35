//! Error types for BrambleDB.

use thiserror::Error;

/// Result type alias using BrambleError.
pub type Result<T> = std::result::Result<T, BrambleError>;

/// Errors that can occur in BrambleDB operations.
///
/// "Key not found" is an expected outcome, not an error; lookups surface it
/// as `Ok(None)` and deletes as `Ok(false)`.
#[derive(Debug, Error)]
pub enum BrambleError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Open/create errors
    #[error("corrupt file header: {0}")]
    CorruptHeader(String),

    #[error("invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    // Storage errors
    #[error("page corrupted at offset {fpos}: {reason}")]
    PageCorrupted { fpos: u64, reason: String },

    // Record errors
    #[error("record size mismatch: expected {expected}, got {actual}")]
    RecordSizeMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: BrambleError = io_err.into();
        assert!(matches!(err, BrambleError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_corrupt_header_display() {
        let err = BrambleError::CorruptHeader("truncated".to_string());
        assert_eq!(err.to_string(), "corrupt file header: truncated");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = BrambleError::InvalidParameter {
            name: "min_degree".to_string(),
            value: "1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid parameter: min_degree = 1");
    }

    #[test]
    fn test_page_corrupted_display() {
        let err = BrambleError::PageCorrupted {
            fpos: 32,
            reason: "record count exceeds node capacity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "page corrupted at offset 32: record count exceeds node capacity"
        );
    }

    #[test]
    fn test_record_size_mismatch_display() {
        let err = BrambleError::RecordSizeMismatch {
            expected: 16,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "record size mismatch: expected 16, got 12"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_ok().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BrambleError>();
    }
}
