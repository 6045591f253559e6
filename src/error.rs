//! Error types for the daygrid core.

use thiserror::Error;

/// Errors that can occur in daygrid operations.
///
/// Nothing in the layout core is fatal: a malformed input degrades a
/// single event rather than aborting a layout pass, so this enum only
/// covers input normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid date string: {0}")]
    InvalidDate(String),
}

/// Result type alias for daygrid operations.
pub type GridResult<T> = Result<T, GridError>;
