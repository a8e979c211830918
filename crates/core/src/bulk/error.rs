//! Bulk request errors.

use thiserror::Error;

/// Errors that reject a whole bulk request before any entry is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    /// More ids than the configured maximum.
    #[error("Bulk request of {requested} entries exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of ids requested.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl BulkError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BatchTooLarge { .. } => 413,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
        }
    }
}
