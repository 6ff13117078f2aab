//! Error types for bucketscope-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during rig operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, rate limited, etc.)
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }
}

impl From<Error> for bucketscope_core::Error {
    fn from(err: Error) -> Self {
        match &err {
            Error::Provider { .. } => bucketscope_core::Error::summary()
                .with_message(err.to_string())
                .with_source(err),
            Error::Config(message) => bucketscope_core::Error::configuration()
                .with_message(message.clone())
                .with_source(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use bucketscope_core::ErrorKind;

    use super::*;

    #[test]
    fn test_conversion_kinds() {
        let error: bucketscope_core::Error = Error::provider("gemini", "quota").into();
        assert_eq!(error.kind(), ErrorKind::Summary);
        assert_eq!(error.display_message(), "provider error: gemini: quota");

        let error: bucketscope_core::Error = Error::config("missing key").into();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(error.display_message(), "missing key");
    }
}
