//! Error types for query summarization

use thiserror::Error;

/// Summary engine error type
///
/// None of these ever reach callers of [`generate_summary`](crate::generate_summary);
/// the facade maps them to the `UNKNOWN` sentinel.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Cache constructed with a capacity that cannot hold any entry
    #[error("Invalid cache capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// No query text was supplied
    #[error("Missing query text")]
    MissingQuery,

    /// Summarization panicked and was contained at the facade
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for summary operations
pub type SummaryResult<T> = Result<T, SummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_message() {
        let err = SummaryError::InvalidCapacity(0);
        assert_eq!(
            err.to_string(),
            "Invalid cache capacity: 0 (must be at least 1)"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SummaryError = io.into();
        assert!(matches!(err, SummaryError::Io(_)));
    }
}
