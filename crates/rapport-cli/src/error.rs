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

    /// Manager configuration error
    #[error(transparent)]
    ManagerConfig(#[from] rapport_manager::ConfigError),

    /// Relationship operation failed
    #[error(transparent)]
    Manager(#[from] rapport_manager::ManagerError),

    /// Storage error
    #[error(transparent)]
    Store(#[from] rapport_store::StoreError),

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

    /// No identity registered under this remote id
    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    /// No relationship with this id
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),
}
