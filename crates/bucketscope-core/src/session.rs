//! Connection context held by a single navigator.

use std::fmt;

use crate::{Error, Result};

/// Opaque bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Bucket, current path and token of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    pub bucket: String,
    /// Slash-delimited prefix; empty means the bucket root.
    pub path: String,
    pub token: AccessToken,
}

impl ConnectionContext {
    /// Validates the credentials and builds a context.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the bucket or token is blank.
    pub fn new(
        bucket: impl Into<String>,
        token: impl Into<AccessToken>,
        path: impl Into<String>,
    ) -> Result<Self> {
        let bucket = bucket.into().trim().to_owned();
        let token = token.into();

        if bucket.is_empty() {
            return Err(Error::invalid_input().with_message("bucket name is required"));
        }
        if token.is_blank() {
            return Err(Error::invalid_input().with_message("access token is required"));
        }

        Ok(Self {
            bucket,
            path: path.into(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.expose(), "ya29.secret");
    }

    #[test]
    fn test_context_requires_bucket_and_token() {
        let err = ConnectionContext::new("", "token", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = ConnectionContext::new("bucket", "  ", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let ctx = ConnectionContext::new(" bucket ", "token", "a/").unwrap();
        assert_eq!(ctx.bucket, "bucket");
        assert_eq!(ctx.path, "a/");
    }
}
