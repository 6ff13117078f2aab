//! Error types for the storage HTTP client.

use bucketscope_core::Error as CoreError;
use thiserror::Error;

/// Result type alias for client internals.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level failures, converted to core errors at the provider boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a status was received.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The configured base URL cannot be used.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The base URL cannot carry path segments.
    #[error("Base URL cannot be a base: {0}")]
    CannotBeABase(String),
}

impl From<Error> for CoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_decode() {
                    CoreError::parse()
                        .with_message(format!("Invalid listing response: {e}"))
                        .with_source(e)
                } else if e.is_timeout() {
                    CoreError::network()
                        .with_message("Request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    CoreError::network()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    CoreError::network()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Url(e) => CoreError::configuration()
                .with_message(format!("Invalid storage base URL: {e}"))
                .with_source(e),
            Error::CannotBeABase(url) => CoreError::configuration()
                .with_message(format!("Invalid storage base URL: {url}")),
        }
    }
}
