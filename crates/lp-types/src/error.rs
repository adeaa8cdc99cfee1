//! Error types for lp-types.

use thiserror::Error;

/// Errors that can occur when working with types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Date or datetime string that matches none of the accepted formats.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
