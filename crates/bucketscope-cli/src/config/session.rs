//! Connection arguments.

use clap::Args;

/// Bucket, token and starting path of the session.
///
/// Both bucket and token are optional at parse time so that a missing value
/// is reported by the navigator like any other blank credential.
#[derive(Clone, Args)]
pub struct SessionConfig {
    /// Bucket to explore
    #[arg(long, env = "GCS_BUCKET")]
    pub bucket: Option<String>,

    /// OAuth2 access token sent as a bearer token
    #[arg(long, env = "GCS_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Initial folder prefix, e.g. `shots/day1/`
    #[arg(long, env = "GCS_PATH", default_value = "")]
    pub path: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("bucket", &self.bucket)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("path", &self.path)
            .finish()
    }
}
