//! Error types for TazaNet

/// Result type alias using TazaNet's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for TazaNet operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Toxicity model loading or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Translation service errors
    #[error("translation error: {0}")]
    Translation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new translation error
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The message without the error-kind prefix
    pub fn detail(&self) -> String {
        match self {
            Self::Classifier(msg)
            | Self::Translation(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
