//! Error types for the DevQuest edge relay

use thiserror::Error;

/// Main error type for edge relay operations
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Configuration errors (config file, origin override, header names)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Proxy/HTTP errors raised while starting or running the server
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for edge relay operations
pub type Result<T> = std::result::Result<T, EdgeError>;
