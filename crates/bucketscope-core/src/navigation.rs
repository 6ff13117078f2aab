//! Navigation and listing state machine.
//!
//! ```text
//! Unauthenticated --authenticate--> Loading --ok--> Ready
//!                                       \--err--> Error(message)
//! Ready | Error --navigate/retry--> Loading
//! any --disconnect--> Unauthenticated
//! ```
//!
//! Every listing run is identified by a [`NavigationTicket`] carrying a
//! monotonically increasing sequence number. A completion is applied only if
//! its ticket is still the latest one, so a slow response can never overwrite
//! the result of a newer navigation.

use strum::IntoStaticStr;

use crate::listing::Listing;
use crate::scenes::SceneSet;
use crate::session::{AccessToken, ConnectionContext};
use crate::store::ObjectStoreService;
use crate::summary::SummaryService;
use crate::{Error, Result};

/// Tracing target for navigation.
pub const TRACING_TARGET: &str = "bucketscope_core::navigation";

/// Page-level state exposed to the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NavigationState {
    #[default]
    Unauthenticated,
    Loading,
    Ready,
    /// The last listing run failed; the message is shown with a retry action.
    Error(String),
}

/// Identifies one run of the listing sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    pub sequence: u64,
    pub bucket: String,
    pub path: String,
    pub token: AccessToken,
}

/// Everything one successful listing run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Prefix the listing was taken at.
    pub path: String,
    pub listing: Listing,
    pub scenes: SceneSet,
}

/// Runs the shared listing sequence for a ticket.
///
/// Lists the prefix, then fetches and parses the first metadata file found
/// among the items. Does not touch any navigator state.
///
/// # Errors
///
/// Returns the first error raised by the listing or the metadata download.
pub async fn run_listing(store: &ObjectStoreService, ticket: &NavigationTicket) -> Result<Snapshot> {
    let listing = store
        .list_objects(&ticket.bucket, &ticket.path, &ticket.token)
        .await?;

    let scenes = match listing.metadata_entry() {
        Some(entry) => {
            tracing::debug!(
                target: TRACING_TARGET,
                sequence = ticket.sequence,
                name = %entry.name,
                "Loading scene metadata"
            );
            let object = store
                .fetch_object(&ticket.bucket, &entry.name, &ticket.token)
                .await?;
            SceneSet::from_slice(&object.data)
        }
        None => SceneSet::default(),
    };

    Ok(Snapshot {
        path: ticket.path.clone(),
        listing,
        scenes,
    })
}

/// Single owner of the session: connection context, listing, scenes and
/// summary.
#[derive(Debug)]
pub struct Navigator {
    store: ObjectStoreService,
    context: Option<ConnectionContext>,
    state: NavigationState,
    snapshot: Snapshot,
    summary: Option<String>,
    sequence: u64,
}

impl Navigator {
    pub fn new(store: ObjectStoreService) -> Self {
        Self {
            store,
            context: None,
            state: NavigationState::Unauthenticated,
            snapshot: Snapshot::default(),
            summary: None,
            sequence: 0,
        }
    }

    pub fn store(&self) -> &ObjectStoreService {
        &self.store
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn context(&self) -> Option<&ConnectionContext> {
        self.context.as_ref()
    }

    /// Listing of the last successful run.
    pub fn listing(&self) -> &Listing {
        &self.snapshot.listing
    }

    /// Scenes of the last successful run.
    pub fn scenes(&self) -> &SceneSet {
        &self.snapshot.scenes
    }

    /// Prefix of the listing currently shown.
    ///
    /// Lags behind the context path while a navigation is loading or after
    /// it failed.
    pub fn listed_path(&self) -> &str {
        &self.snapshot.path
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.context.is_some()
    }

    /// Validates credentials, stores the context and lists `initial_path`.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the bucket or token is blank; the
    /// navigator then stays unauthenticated. Listing failures are not
    /// returned, they move the navigator to [`NavigationState::Error`].
    pub async fn authenticate(
        &mut self,
        bucket: impl Into<String>,
        token: impl Into<AccessToken>,
        initial_path: impl Into<String>,
    ) -> Result<&NavigationState> {
        let ticket = self.begin_authenticate(bucket, token, initial_path)?;
        Ok(self.execute(ticket).await)
    }

    /// Replaces the current path and lists it.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when called before authentication.
    pub async fn navigate(&mut self, path: impl Into<String>) -> Result<&NavigationState> {
        let ticket = self.begin_navigate(path)?;
        Ok(self.execute(ticket).await)
    }

    /// Lists the current path again with the same bucket and token.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when called before authentication.
    pub async fn retry(&mut self) -> Result<&NavigationState> {
        let ticket = self.begin_retry()?;
        Ok(self.execute(ticket).await)
    }

    /// First half of [`authenticate`](Self::authenticate): validates and
    /// issues a ticket without performing any I/O.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the bucket or token is blank.
    pub fn begin_authenticate(
        &mut self,
        bucket: impl Into<String>,
        token: impl Into<AccessToken>,
        initial_path: impl Into<String>,
    ) -> Result<NavigationTicket> {
        let context = ConnectionContext::new(bucket, token, initial_path)?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %context.bucket,
            path = %context.path,
            "Session authenticated"
        );

        self.snapshot = Snapshot {
            path: context.path.clone(),
            ..Snapshot::default()
        };
        self.context = Some(context);
        self.begin_retry()
    }

    /// First half of [`navigate`](Self::navigate).
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when called before authentication.
    pub fn begin_navigate(&mut self, path: impl Into<String>) -> Result<NavigationTicket> {
        let context = self.context.as_mut().ok_or_else(not_authenticated)?;
        context.path = path.into();
        self.begin_retry()
    }

    /// First half of [`retry`](Self::retry).
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when called before authentication.
    pub fn begin_retry(&mut self) -> Result<NavigationTicket> {
        let context = self.context.as_ref().ok_or_else(not_authenticated)?;

        self.sequence += 1;
        let ticket = NavigationTicket {
            sequence: self.sequence,
            bucket: context.bucket.clone(),
            path: context.path.clone(),
            token: context.token.clone(),
        };

        self.state = NavigationState::Loading;
        self.summary = None;

        tracing::debug!(
            target: TRACING_TARGET,
            sequence = ticket.sequence,
            bucket = %ticket.bucket,
            path = %ticket.path,
            "Listing started"
        );

        Ok(ticket)
    }

    /// Applies the outcome of a listing run.
    ///
    /// Returns `false` and changes nothing if the ticket has been superseded
    /// by a newer navigation or the session was disconnected meanwhile.
    pub fn complete(&mut self, ticket: &NavigationTicket, outcome: Result<Snapshot>) -> bool {
        if self.context.is_none() || ticket.sequence != self.sequence {
            tracing::debug!(
                target: TRACING_TARGET,
                sequence = ticket.sequence,
                current = self.sequence,
                "Discarding stale listing result"
            );
            return false;
        }

        match outcome {
            Ok(snapshot) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    sequence = ticket.sequence,
                    path = %ticket.path,
                    folders = snapshot.listing.prefixes.len(),
                    objects = snapshot.listing.items.len(),
                    scenes = snapshot.scenes.len(),
                    "Listing ready"
                );
                self.snapshot = snapshot;
                self.state = NavigationState::Ready;
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    sequence = ticket.sequence,
                    path = %ticket.path,
                    error = %error,
                    "Listing failed"
                );
                self.state = NavigationState::Error(error.display_message());
            }
        }

        true
    }

    /// Generates a summary of the current scenes, if there are any.
    ///
    /// Returns `None` without calling the model when no scenes are loaded.
    pub async fn summarize(&mut self, generator: &SummaryService) -> Option<&str> {
        if self.snapshot.scenes.is_empty() {
            return None;
        }

        let text = generator.summarize(self.snapshot.scenes.records()).await;
        self.summary = Some(text);
        self.summary.as_deref()
    }

    /// Drops the summary panel.
    pub fn dismiss_summary(&mut self) {
        self.summary = None;
    }

    /// Returns to the unauthenticated state and forgets all session data.
    pub fn disconnect(&mut self) {
        tracing::info!(target: TRACING_TARGET, "Session disconnected");

        self.context = None;
        self.snapshot = Snapshot::default();
        self.summary = None;
        self.state = NavigationState::Unauthenticated;
        // Outstanding tickets must not revive the old session.
        self.sequence += 1;
    }

    async fn execute(&mut self, ticket: NavigationTicket) -> &NavigationState {
        let outcome = run_listing(&self.store, &ticket).await;
        self.complete(&ticket, outcome);
        &self.state
    }
}

fn not_authenticated() -> Error {
    Error::invalid_input().with_message("not connected to a bucket")
}
