//! Error types for SetuBridge

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SetuBridge error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be written back
    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Message could not be serialized to the wire format
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configured broker endpoint does not resolve to a socket address
    #[error("Invalid broker address: {0}")]
    InvalidAddress(String),

    /// Catch-all for thread spawn and similar failures
    #[error("{0}")]
    Other(String),
}
