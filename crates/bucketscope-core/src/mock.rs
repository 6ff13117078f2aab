//! In-memory providers for testing.
//!
//! This module is only available with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! bucketscope-core = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! [`MockObjectStore`] answers listings the way a real bucket does, grouping
//! keys below the requested prefix into folder prefixes at the next `/`, and
//! records every call for later assertions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::listing::{DELIMITER, Listing, ObjectEntry};
use crate::session::AccessToken;
use crate::store::{ObjectBytes, ObjectStoreProvider};
use crate::summary::TextGenerator;
use crate::{Error, ErrorKind, Result};

/// A call observed by [`MockObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List { bucket: String, prefix: String },
    Fetch { bucket: String, name: String },
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

#[derive(Debug, Clone)]
struct Failure {
    kind: ErrorKind,
    message: Option<String>,
}

impl Failure {
    fn from_error(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.message.clone(),
        }
    }

    fn to_error(&self) -> Error {
        let error = Error::new(self.kind);
        match &self.message {
            Some(message) => error.with_message(message.clone()),
            None => error,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    objects: BTreeMap<(String, String), StoredObject>,
    listings: HashMap<(String, String), Listing>,
    calls: Vec<StoreCall>,
    list_failure: Option<Failure>,
    fetch_failure: Option<Failure>,
}

/// In-memory object store.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an object.
    pub fn with_object(
        self,
        bucket: &str,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Self {
        self.lock().objects.insert(
            (bucket.to_owned(), name.to_owned()),
            StoredObject {
                data,
                content_type: content_type.to_owned(),
            },
        );
        self
    }

    /// Pins the exact listing returned for `prefix`, bypassing synthesis.
    pub fn with_listing(self, bucket: &str, prefix: &str, listing: Listing) -> Self {
        self.lock()
            .listings
            .insert((bucket.to_owned(), prefix.to_owned()), listing);
        self
    }

    /// Makes every following listing fail with `error`'s kind and message.
    pub fn fail_listings(&self, error: Error) {
        self.lock().list_failure = Some(Failure::from_error(&error));
    }

    /// Makes every following download fail with `error`'s kind and message.
    pub fn fail_fetches(&self, error: Error) {
        self.lock().fetch_failure = Some(Failure::from_error(&error));
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.list_failure = None;
        state.fetch_failure = None;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Object names requested through `fetch_object`, in order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Fetch { name, .. } => Some(name.clone()),
                StoreCall::List { .. } => None,
            })
            .collect()
    }

    fn synthesize(state: &StoreState, bucket: &str, prefix: &str) -> Listing {
        let mut prefixes = BTreeSet::new();
        let mut items = Vec::new();

        for ((object_bucket, name), object) in &state.objects {
            if object_bucket != bucket {
                continue;
            }
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };

            match rest.find(DELIMITER) {
                Some(index) => {
                    prefixes.insert(format!("{prefix}{}", &rest[..=index]));
                }
                None => items.push(ObjectEntry {
                    name: name.clone(),
                    kind: Some("storage#object".to_owned()),
                    bucket: Some(bucket.to_owned()),
                    size: Some(object.data.len().to_string()),
                    content_type: Some(object.content_type.clone()),
                    ..Default::default()
                }),
            }
        }

        Listing {
            prefixes: prefixes.into_iter().collect(),
            items,
            next_page_token: None,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for MockObjectStore {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        _token: &AccessToken,
    ) -> Result<Listing> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List {
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
        });

        if let Some(failure) = &state.list_failure {
            return Err(failure.to_error());
        }

        let key = (bucket.to_owned(), prefix.to_owned());
        Ok(match state.listings.get(&key) {
            Some(listing) => listing.clone(),
            None => Self::synthesize(&state, bucket, prefix),
        })
    }

    async fn fetch_object(
        &self,
        bucket: &str,
        name: &str,
        _token: &AccessToken,
    ) -> Result<ObjectBytes> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Fetch {
            bucket: bucket.to_owned(),
            name: name.to_owned(),
        });

        if let Some(failure) = &state.fetch_failure {
            return Err(failure.to_error());
        }

        state
            .objects
            .get(&(bucket.to_owned(), name.to_owned()))
            .map(|object| {
                ObjectBytes::new(object.data.clone(), Some(object.content_type.clone()))
            })
            .ok_or_else(|| Error::request().with_message("Failed to fetch media: Not Found"))
    }
}

#[derive(Debug, Default)]
struct GeneratorState {
    prompts: Vec<String>,
}

/// Text generator returning a fixed answer or a fixed failure.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    outcome: std::result::Result<String, String>,
    state: Arc<Mutex<GeneratorState>>,
}

impl MockTextGenerator {
    /// Answers every prompt with `text`.
    pub fn responding(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
            state: Arc::default(),
        }
    }

    /// Fails every prompt with a summary error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            state: Arc::default(),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prompts
            .clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prompts
            .push(prompt.to_owned());

        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(Error::summary().with_message(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_groups_by_delimiter() {
        let store = MockObjectStore::new()
            .with_object("b", "root.txt", b"r".to_vec(), "text/plain")
            .with_object("b", "dir/one.png", b"1".to_vec(), "image/png")
            .with_object("b", "dir/sub/two.png", b"2".to_vec(), "image/png")
            .with_object("other", "dir/three.png", b"3".to_vec(), "image/png");
        let token = AccessToken::new("t");

        let root = store.list_objects("b", "", &token).await.unwrap();
        assert_eq!(root.prefixes, vec!["dir/".to_owned()]);
        assert_eq!(root.items.len(), 1);
        assert_eq!(root.items[0].size.as_deref(), Some("1"));

        let dir = store.list_objects("b", "dir/", &token).await.unwrap();
        assert_eq!(dir.prefixes, vec!["dir/sub/".to_owned()]);
        assert_eq!(dir.items[0].name, "dir/one.png");
    }

    #[tokio::test]
    async fn test_missing_object_is_a_request_error() {
        let store = MockObjectStore::new();
        let error = store
            .fetch_object("b", "nope", &AccessToken::new("t"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Request);
        assert_eq!(error.display_message(), "Failed to fetch media: Not Found");
        assert_eq!(store.fetch_calls(), vec!["nope".to_owned()]);
    }
}
