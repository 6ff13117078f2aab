//! Common error type definitions.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while exploring a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The object store answered with a non-success status.
    Request,
    /// A metadata payload could not be interpreted.
    Parse,
    /// An image could not be fetched for display.
    ResourceLoad,
    /// The text-generation call failed.
    Summary,
    /// Input validation failed.
    InvalidInput,
    /// The request never produced a response.
    Network,
    /// Configuration error.
    Configuration,
    /// Serialization/deserialization error.
    Serialization,
}

/// Structured error with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Human readable message, shown as-is to the user.
    pub message: Option<String>,
    /// Additional context information.
    pub context: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a new request error.
    pub fn request() -> Self {
        Self::new(ErrorKind::Request)
    }

    /// Creates a new parse error.
    pub fn parse() -> Self {
        Self::new(ErrorKind::Parse)
    }

    /// Creates a new resource load error.
    pub fn resource_load() -> Self {
        Self::new(ErrorKind::ResourceLoad)
    }

    /// Creates a new summary error.
    pub fn summary() -> Self {
        Self::new(ErrorKind::Summary)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new network error.
    pub fn network() -> Self {
        Self::new(ErrorKind::Network)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message meant for display, falling back to the kind name.
    pub fn display_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.kind.as_ref().to_owned())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(error.to_string())
            .with_source(error)
    }
}
