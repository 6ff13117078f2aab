//! Object-store abstraction.
//!
//! The two operations the explorer needs from a store are expressed as the
//! [`ObjectStoreProvider`] trait. [`ObjectStoreService`] wraps any provider in
//! an `Arc` for cheap cloning and adds structured logging around every call.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use crate::listing::Listing;
use crate::session::AccessToken;
use crate::Result;

/// Tracing target for object-store operations.
pub const TRACING_TARGET: &str = "bucketscope_core::store";

/// Raw object body returned by [`ObjectStoreProvider::fetch_object`].
#[derive(Debug, Clone)]
pub struct ObjectBytes {
    /// Raw bytes of the object.
    pub data: Bytes,
    /// MIME content-type, if the store sent one.
    pub content_type: Option<String>,
}

impl ObjectBytes {
    pub fn new(data: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            content_type,
        }
    }
}

/// Core trait for object-store access.
///
/// Implementations attach the bearer token to every call, never retry and
/// never cache.
#[async_trait::async_trait]
pub trait ObjectStoreProvider: Send + Sync {
    /// Lists exactly one folder level under `prefix`, grouping deeper keys
    /// into prefixes by `/`.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        token: &AccessToken,
    ) -> Result<Listing>;

    /// Downloads the body of the object `name`.
    async fn fetch_object(
        &self,
        bucket: &str,
        name: &str,
        token: &AccessToken,
    ) -> Result<ObjectBytes>;
}

/// Object-store service wrapper with observability.
#[derive(Clone)]
pub struct ObjectStoreService {
    inner: Arc<dyn ObjectStoreProvider>,
}

impl std::fmt::Debug for ObjectStoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreService").finish_non_exhaustive()
    }
}

impl ObjectStoreService {
    /// Wraps a concrete provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: ObjectStoreProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Wraps an already shared provider.
    pub fn from_arc(provider: Arc<dyn ObjectStoreProvider>) -> Self {
        Self { inner: provider }
    }

    /// Lists one prefix level.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        token: &AccessToken,
    ) -> Result<Listing> {
        let start = Instant::now();
        tracing::debug!(target: TRACING_TARGET, bucket, prefix, "Listing objects");

        let result = self.inner.list_objects(bucket, prefix, token).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(listing) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    bucket,
                    prefix,
                    prefixes = listing.prefixes.len(),
                    items = listing.items.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Listing completed"
                );

                if listing.is_truncated() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        bucket,
                        prefix,
                        "Listing has more pages; only the first page is shown"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    bucket,
                    prefix,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Listing failed"
                );
            }
        }

        result
    }

    /// Downloads one object.
    pub async fn fetch_object(
        &self,
        bucket: &str,
        name: &str,
        token: &AccessToken,
    ) -> Result<ObjectBytes> {
        let start = Instant::now();
        tracing::debug!(target: TRACING_TARGET, bucket, name, "Fetching object");

        let result = self.inner.fetch_object(bucket, name, token).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(object) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    bucket,
                    name,
                    size = object.data.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Object fetched"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    bucket,
                    name,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Object fetch failed"
                );
            }
        }

        result
    }
}
