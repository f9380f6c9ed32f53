use thiserror::Error;

/// Top-level error type for N.I.K.
///
/// Downstream crates define their own error enums and convert into (or from)
/// this one so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NikError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),
}

impl From<toml::de::Error> for NikError {
    fn from(err: toml::de::Error) -> Self {
        NikError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NikError {
    fn from(err: toml::ser::Error) -> Self {
        NikError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NikError {
    fn from(err: serde_json::Error) -> Self {
        NikError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for N.I.K operations.
pub type Result<T> = std::result::Result<T, NikError>;
