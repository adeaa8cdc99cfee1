//! Error types for table persistence.

use thiserror::Error;

/// Errors that can occur when reading or writing tables.
#[derive(Debug, Error)]
pub enum IoError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from the header.
    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    /// A row that cannot be parsed.
    #[error("malformed row at line {line}{}: {reason}", user_suffix(.user))]
    MalformedRow {
        line: u64,
        user: Option<String>,
        reason: String,
    },
}

fn user_suffix(user: &Option<String>) -> String {
    user.as_deref()
        .map(|u| format!(" (user {})", u))
        .unwrap_or_default()
}
