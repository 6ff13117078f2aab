//! Reqwest-based storage JSON API client.

use std::sync::Arc;

use bucketscope_core::listing::Listing;
use bucketscope_core::session::AccessToken;
use bucketscope_core::store::{ObjectBytes, ObjectStoreProvider, ObjectStoreService};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::{Error, GcsConfig, TRACING_TARGET};

/// Host serving unauthenticated public object URLs.
const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Public, unauthenticated URL of an object.
///
/// Only works for publicly readable buckets; the explorer itself always
/// downloads through the authenticated media endpoint.
pub fn public_url(bucket: &str, name: &str) -> String {
    format!("{PUBLIC_HOST}/{bucket}/{name}")
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

/// Message for a failed listing: the store's own message when the body
/// carries one, a generic status line otherwise.
fn listing_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("GCS request failed: {}", status_text(status)))
}

fn media_error_message(status: StatusCode) -> String {
    format!("Failed to fetch media: {}", status_text(status))
}

/// Inner client that holds the HTTP client and configuration.
struct GcsClientInner {
    http: Client,
    base_url: Url,
    config: GcsConfig,
}

/// Storage JSON API client.
///
/// Implements [`ObjectStoreProvider`]; every request carries the session's
/// bearer token.
///
/// # Examples
///
/// ```rust,ignore
/// use bucketscope_gcs::{GcsClient, GcsConfig};
///
/// let service = GcsClient::new(GcsConfig::default())?.into_service();
/// let listing = service.list_objects("my-bucket", "shots/", &token).await?;
/// ```
#[derive(Clone)]
pub struct GcsClient {
    inner: Arc<GcsClientInner>,
}

impl std::fmt::Debug for GcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl GcsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid, or a network
    /// error if the HTTP client cannot be built.
    pub fn new(config: GcsConfig) -> bucketscope_core::Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(Error::from)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeABase(config.base_url.clone()).into());
        }

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %base_url,
            timeout_ms = timeout.as_millis(),
            "Creating storage client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(Error::from)?;

        let inner = GcsClientInner {
            http,
            base_url,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &GcsConfig {
        &self.inner.config
    }

    /// Converts this client into an [`ObjectStoreService`].
    pub fn into_service(self) -> ObjectStoreService {
        ObjectStoreService::new(self)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Checked in `new`: the base URL can carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL listing one level under `prefix`.
    pub fn list_url(&self, bucket: &str, prefix: &str) -> Url {
        let mut url = self.endpoint(&["b", bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("prefix", prefix)
            .append_pair("delimiter", "/");
        url
    }

    /// URL downloading the body of `name`. The whole name is one path segment.
    pub fn media_url(&self, bucket: &str, name: &str) -> Url {
        let mut url = self.endpoint(&["b", bucket, "o", name]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for GcsClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        token: &AccessToken,
    ) -> bucketscope_core::Result<Listing> {
        let url = self.list_url(bucket, prefix);

        tracing::trace!(target: TRACING_TARGET, url = %url, "Sending listing request");

        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = listing_error_message(status, &body);

            tracing::debug!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                message = %message,
                "Listing rejected"
            );

            return Err(bucketscope_core::Error::request()
                .with_message(message)
                .with_context(format!("status {}", status.as_u16())));
        }

        let listing = response.json::<Listing>().await.map_err(Error::from)?;
        Ok(listing)
    }

    async fn fetch_object(
        &self,
        bucket: &str,
        name: &str,
        token: &AccessToken,
    ) -> bucketscope_core::Result<ObjectBytes> {
        let url = self.media_url(bucket, name);

        tracing::trace!(target: TRACING_TARGET, url = %url, "Sending media request");

        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(bucketscope_core::Error::request()
                .with_message(media_error_message(status))
                .with_context(format!("status {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let data = response.bytes().await.map_err(Error::from)?;

        Ok(ObjectBytes::new(data, content_type))
    }
}
