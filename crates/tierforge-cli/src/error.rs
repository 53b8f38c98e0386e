//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error(transparent)]
    Store(#[from] tierforge_store::StoreError),

    /// Domain rule violated
    #[error(transparent)]
    Domain(#[from] tierforge_domain::DomainError),

    /// Parameter definition rejected before reaching the store
    #[error("Parameter error: {0}")]
    Parameter(#[from] tierforge_domain::ParameterError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record missing or not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// No active user
    #[error("No active user. Use 'signup' first.")]
    NotSignedIn,
}
