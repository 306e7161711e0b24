//! Error types for Unarya Core.

use thiserror::Error;
use unarya_abstraction::ModelError;

/// Core error type for Unarya operations.
#[derive(Error, Debug)]
pub enum UnaryaError {
    /// Server-related errors
    #[error("Server error: {0}")]
    Server(#[from] tonic::transport::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address parsing errors
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid server lifecycle transition
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Model-related errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type alias for Unarya operations.
pub type Result<T> = std::result::Result<T, UnaryaError>;
