use std::path::PathBuf;

/// Boxed cause carried by [`ConfigError::Configuration`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while binding settings or applying them to a resolver
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The resolver does not expose the capability the apply step needs
    #[error("Type mismatch: view resolver '{actual}' is not a {expected}")]
    TypeMismatch { expected: String, actual: String },

    /// The delegated resolver integration failed
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A flat configuration value could not be converted to the field's type
    #[error("Invalid value '{value}' for '{key}' (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    /// A settings document could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A settings file could not be read
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a TypeMismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a Configuration error wrapping its cause
    pub fn configuration(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an Io error for the file at `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
