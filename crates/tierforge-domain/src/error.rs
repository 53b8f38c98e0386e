//! Domain error types

use thiserror::Error;

/// Hard failures raised by the domain layer.
///
/// Recoverable move failures are reported through
/// [`MoveRejected`](crate::MoveRejected) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid tier-name setup; fatal to constructing an assignment
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A persisted tier-document could not be decoded
    #[error("Invalid tier document: {0}")]
    InvalidDocument(String),

    /// A record identifier could not be parsed
    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}
