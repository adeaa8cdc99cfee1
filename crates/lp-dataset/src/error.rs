//! Error types for dataset construction.

use thiserror::Error;

/// Errors that can occur while selecting periods or building datasets.
///
/// Empty results (a user without a `position_open`, grid points before
/// market coverage) are not errors; they simply contribute no rows.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Invalid configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Invalid time range.
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    /// An input action that cannot be reconstructed.
    #[error("malformed action at index {index} (user {user:?}): {reason}")]
    MalformedAction {
        index: usize,
        user: String,
        reason: String,
    },

    /// Grid timestamp that cannot be rendered as a datetime.
    #[error("invalid timestamp {timestamp} for user {user}")]
    InvalidTimestamp { user: String, timestamp: i64 },

    /// Error from the shared types.
    #[error("type error: {0}")]
    Type(#[from] lp_types::TypeError),
}
