//! Authenticated image loading with revocable display handles.
//!
//! A [`HandleRegistry`] plays the part of the process-local blob store: it
//! keeps fetched bytes addressable by a `blob:` URL for as long as the
//! matching [`DisplayHandle`] is alive. Dropping the handle revokes the URL,
//! so release happens exactly once on every exit path.
//!
//! An [`ImageSlot`] is one view position (a gallery tile, the detail pane).
//! It owns at most one handle and swaps it whenever the requested
//! [`ResourceIdentity`] changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use uuid::Uuid;

use crate::session::AccessToken;
use crate::store::{ObjectBytes, ObjectStoreService};
use crate::{Error, Result};

/// Tracing target for resource loading.
pub const TRACING_TARGET: &str = "bucketscope_core::loader";

const URL_SCHEME: &str = "blob:bucketscope/";

/// What a slot displays: one object fetched with one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub bucket: String,
    pub name: String,
    pub token: AccessToken,
}

impl ResourceIdentity {
    pub fn new(
        bucket: impl Into<String>,
        name: impl Into<String>,
        token: impl Into<AccessToken>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    blobs: HashMap<Uuid, ObjectBytes>,
    created: u64,
    released: u64,
}

/// Process-local store of displayable blobs.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers bytes and returns the handle that keeps them alive.
    pub fn create(&self, object: ObjectBytes) -> DisplayHandle {
        let id = Uuid::new_v4();
        let content_type = object.content_type.clone();
        let size = object.data.len();

        let mut inner = self.lock();
        inner.blobs.insert(id, object);
        inner.created += 1;
        drop(inner);

        DisplayHandle {
            id,
            url: format!("{URL_SCHEME}{id}"),
            content_type,
            size,
            registry: self.clone(),
        }
    }

    /// Looks up the bytes behind a handle URL. Revoked URLs resolve to nothing.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let id = url.strip_prefix(URL_SCHEME)?.parse::<Uuid>().ok()?;
        self.lock().blobs.get(&id).map(|object| object.data.clone())
    }

    /// Number of handles currently alive.
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }

    /// Total handles ever created.
    pub fn created_count(&self) -> u64 {
        self.lock().created
    }

    /// Total handles released.
    pub fn released_count(&self) -> u64 {
        self.lock().released
    }

    fn release(&self, id: Uuid) {
        let mut inner = self.lock();
        if inner.blobs.remove(&id).is_some() {
            inner.released += 1;
        }
    }
}

/// Revocable reference to fetched bytes. Released on drop.
#[derive(Debug)]
pub struct DisplayHandle {
    id: Uuid,
    url: String,
    content_type: Option<String>,
    size: usize,
    registry: HandleRegistry,
}

impl DisplayHandle {
    /// The `blob:` URL under which the bytes are reachable.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Current bytes behind this handle.
    pub fn bytes(&self) -> Option<Bytes> {
        self.registry.resolve(&self.url)
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        tracing::trace!(target: TRACING_TARGET, url = %self.url, "Releasing display handle");
        self.registry.release(self.id);
    }
}

/// Observable state of an [`ImageSlot`].
#[derive(Debug, Default)]
pub enum LoadState {
    /// Nothing requested yet, or the slot was cleared.
    #[default]
    Idle,
    Loading,
    Ready(DisplayHandle),
    /// The fetch failed; shown as a placeholder.
    Failed(Error),
}

impl LoadState {
    pub fn handle(&self) -> Option<&DisplayHandle> {
        match self {
            Self::Ready(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// One view position that displays at most one image at a time.
#[derive(Debug)]
pub struct ImageSlot {
    store: ObjectStoreService,
    registry: HandleRegistry,
    identity: Option<ResourceIdentity>,
    state: LoadState,
}

impl ImageSlot {
    pub fn new(store: ObjectStoreService, registry: HandleRegistry) -> Self {
        Self {
            store,
            registry,
            identity: None,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn identity(&self) -> Option<&ResourceIdentity> {
        self.identity.as_ref()
    }

    /// Displays `identity`, fetching it unless it is already shown.
    ///
    /// The previous handle is released before the new fetch starts.
    /// Failures are kept in the slot and never returned to the caller.
    pub async fn load(&mut self, identity: ResourceIdentity) -> &LoadState {
        if self.identity.as_ref() == Some(&identity) && self.state.is_ready() {
            return &self.state;
        }

        // Replacing the state drops the old handle.
        self.state = LoadState::Loading;
        self.identity = Some(identity.clone());
        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %identity.bucket,
            name = %identity.name,
            "Loading image"
        );

        let result = self.fetch(&identity).await;
        self.state = match result {
            Ok(object) => LoadState::Ready(self.registry.create(object)),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    bucket = %identity.bucket,
                    name = %identity.name,
                    error = %error,
                    "Error loading image"
                );
                LoadState::Failed(error)
            }
        };

        &self.state
    }

    async fn fetch(&self, identity: &ResourceIdentity) -> Result<ObjectBytes> {
        self.store
            .fetch_object(&identity.bucket, &identity.name, &identity.token)
            .await
            .map_err(|error| {
                Error::resource_load()
                    .with_message(format!("Failed to load image {}", identity.name))
                    .with_source(error)
            })
    }

    /// Releases whatever the slot holds and forgets the identity.
    pub fn clear(&mut self) {
        self.state = LoadState::Idle;
        self.identity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::mock::MockObjectStore;

    fn fixture() -> (MockObjectStore, ObjectStoreService, HandleRegistry) {
        let mock = MockObjectStore::new()
            .with_object("b", "a.png", b"aaaa".to_vec(), "image/png")
            .with_object("b", "b.png", b"bb".to_vec(), "image/png");
        let service = ObjectStoreService::new(mock.clone());
        (mock, service, HandleRegistry::new())
    }

    #[test]
    fn test_handle_released_once_on_drop() {
        let registry = HandleRegistry::new();
        let handle = registry.create(ObjectBytes::new(b"xyz".to_vec(), None));
        let url = handle.url().to_owned();

        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.resolve(&url).as_deref(), Some(&b"xyz"[..]));

        drop(handle);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 1);
        assert!(registry.resolve(&url).is_none());
    }

    #[tokio::test]
    async fn test_identity_change_releases_previous_handle() {
        let (_, service, registry) = fixture();
        let mut slot = ImageSlot::new(service, registry.clone());

        slot.load(ResourceIdentity::new("b", "a.png", "t")).await;
        let first_url = slot.state().handle().unwrap().url().to_owned();
        assert_eq!(registry.live_count(), 1);

        slot.load(ResourceIdentity::new("b", "b.png", "t")).await;
        assert!(slot.state().is_ready());
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.created_count(), 2);
        assert_eq!(registry.released_count(), 1);
        assert!(registry.resolve(&first_url).is_none());
        assert_eq!(slot.state().handle().unwrap().size(), 2);
    }

    #[tokio::test]
    async fn test_same_identity_is_not_refetched() {
        let (mock, service, registry) = fixture();
        let mut slot = ImageSlot::new(service, registry.clone());

        let identity = ResourceIdentity::new("b", "a.png", "t");
        slot.load(identity.clone()).await;
        slot.load(identity).await;

        assert_eq!(mock.fetch_calls().len(), 1);
        assert_eq!(registry.created_count(), 1);
        assert_eq!(registry.released_count(), 0);
    }

    #[tokio::test]
    async fn test_token_change_is_a_new_identity() {
        let (mock, service, registry) = fixture();
        let mut slot = ImageSlot::new(service, registry.clone());

        slot.load(ResourceIdentity::new("b", "a.png", "t1")).await;
        slot.load(ResourceIdentity::new("b", "a.png", "t2")).await;

        assert_eq!(mock.fetch_calls().len(), 2);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.released_count(), 1);
    }

    #[tokio::test]
    async fn test_teardown_releases_last_handle_once() {
        let (_, service, registry) = fixture();
        let mut slot = ImageSlot::new(service, registry.clone());
        slot.load(ResourceIdentity::new("b", "a.png", "t")).await;

        slot.clear();
        assert_eq!(registry.released_count(), 1);

        drop(slot);
        assert_eq!(registry.released_count(), 1);
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_without_clear_releases_handle() {
        let (_, service, registry) = fixture();
        {
            let mut slot = ImageSlot::new(service, registry.clone());
            slot.load(ResourceIdentity::new("b", "a.png", "t")).await;
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_releases_previous_and_stays_local() {
        let (_, service, registry) = fixture();
        let mut slot = ImageSlot::new(service, registry.clone());
        slot.load(ResourceIdentity::new("b", "a.png", "t")).await;

        let state = slot.load(ResourceIdentity::new("b", "gone.png", "t")).await;
        match state {
            LoadState::Failed(error) => assert_eq!(error.kind(), ErrorKind::ResourceLoad),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 1);
    }
}
