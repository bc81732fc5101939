//! Orchestration of a single CRUD intent end-to-end

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::model::{validate_title, NewTodo, PageKey, Todo, TodoPatch};
use crate::store::TodoStore;
use crate::sync::cache::{ListCache, RollbackToken, Snapshot};

/// A user-initiated mutation, kept as a value so a failed attempt can be
/// re-dispatched unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    /// Create the candidate entry
    Create(NewTodo),

    /// Apply a partial update to the entry with the given id
    Update { id: Uuid, patch: TodoPatch },

    /// Delete the entry with the given id
    Delete { id: Uuid },
}

/// Terminal state of one mutation.
///
/// A mutation is pending from the moment its optimistic change lands in the
/// cache until the remote call resolves, then ends in exactly one of these.
#[derive(Debug)]
pub enum MutationOutcome {
    /// The remote call succeeded and an authoritative refetch of the current
    /// page has run. `confirmed` carries the server-normalized entry, or
    /// `None` for a delete.
    Reconciled { confirmed: Option<Todo> },

    /// The remote call failed. Any optimistic change was rolled back;
    /// `retry` is the identical intent, ready for re-dispatch.
    RolledBack { error: Error, retry: MutationIntent },
}

/// Drives each CRUD intent end-to-end against one page of todos:
/// optimistic cache mutation, remote call, then commit or rollback.
///
/// Construct one coordinator per view scope and drop it when the view goes
/// away; the cache it owns is not shared between coordinators. Methods take
/// `&self`, so independent mutations may be in flight concurrently; each
/// holds only its own rollback token.
pub struct MutationCoordinator<S> {
    store: S,
    cache: Arc<Mutex<ListCache>>,
}

impl<S: TodoStore> MutationCoordinator<S> {
    /// Create a coordinator with an empty cache for the given page
    pub fn new(store: S, key: PageKey) -> Self {
        Self {
            store,
            cache: Arc::new(Mutex::new(ListCache::new(key))),
        }
    }

    /// The page this coordinator synchronizes
    pub fn page_key(&self) -> PageKey {
        self.cache().key()
    }

    /// A copy of the current page snapshot, for rendering
    pub fn snapshot(&self) -> Snapshot {
        self.cache().snapshot()
    }

    /// Validate and submit a create intent.
    ///
    /// The title is trimmed and checked before anything else happens; a
    /// rejected title returns `Err` with the cache untouched and no request
    /// sent.
    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<MutationOutcome, Error> {
        let title = validate_title(title)?;
        self.submit(MutationIntent::Create(NewTodo::new(&title, description)))
            .await
    }

    /// Validate and submit an update intent
    pub async fn update(&self, id: Uuid, mut patch: TodoPatch) -> Result<MutationOutcome, Error> {
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        self.submit(MutationIntent::Update { id, patch }).await
    }

    /// Set or clear the completion flag of one entry
    pub async fn set_done(&self, id: Uuid, done: bool) -> Result<MutationOutcome, Error> {
        self.submit(MutationIntent::Update {
            id,
            patch: TodoPatch::new().with_done(done),
        })
        .await
    }

    /// Submit a delete intent
    pub async fn delete(&self, id: Uuid) -> Result<MutationOutcome, Error> {
        self.submit(MutationIntent::Delete { id }).await
    }

    /// Drive one intent through `Pending → Reconciled | RolledBack`.
    ///
    /// `Err` means the intent was rejected before the state machine started:
    /// no cache mutation, no remote call.
    pub async fn submit(&self, intent: MutationIntent) -> Result<MutationOutcome, Error> {
        self.check(&intent)?;

        let token = self.apply_optimistic(&intent);
        debug!("dispatching {:?}", intent);

        match self.dispatch(&intent).await {
            Ok(confirmed) => {
                info!("mutation reconciled, refetching page");
                if let Err(error) = self.refresh().await {
                    // The next successful refetch converges the cache.
                    warn!("refetch after successful mutation failed: {}", error);
                }
                Ok(MutationOutcome::Reconciled { confirmed })
            }
            Err(error) => {
                if let Some(token) = token {
                    warn!("rolling back optimistic change: {}", error);
                    self.cache().rollback(token);
                }
                Ok(MutationOutcome::RolledBack {
                    error,
                    retry: intent,
                })
            }
        }
    }

    /// Re-dispatch a previously failed intent unchanged
    pub async fn retry(&self, intent: MutationIntent) -> Result<MutationOutcome, Error> {
        self.submit(intent).await
    }

    /// Authoritative refetch of the current page, replacing the snapshot
    /// wholesale. A response that lost the race to a newer refetch is
    /// discarded.
    pub async fn refresh(&self) -> Result<(), Error> {
        let (key, generation) = {
            let mut cache = self.cache();
            (cache.key(), cache.begin_refresh())
        };

        let (entries, total) = self.store.list(key).await?;
        self.cache().complete_refresh(generation, entries, total);
        Ok(())
    }

    /// Pre-flight checks on an intent built by hand
    fn check(&self, intent: &MutationIntent) -> Result<(), Error> {
        match intent {
            MutationIntent::Create(candidate) => {
                validate_title(&candidate.title)?;
            }
            MutationIntent::Update { patch, .. } => {
                if let Some(title) = &patch.title {
                    validate_title(title)?;
                }
            }
            MutationIntent::Delete { .. } => {}
        }
        Ok(())
    }

    /// Apply the optimistic change for an intent. `None` means the change
    /// was a no-op (the id is not on this page) and no rollback is needed.
    fn apply_optimistic(&self, intent: &MutationIntent) -> Option<RollbackToken> {
        let mut cache = self.cache();
        match intent {
            MutationIntent::Create(candidate) => {
                Some(cache.apply_insert(candidate.to_optimistic_entry()))
            }
            MutationIntent::Update { id, patch } => cache.apply_update(*id, patch),
            MutationIntent::Delete { id } => cache.apply_remove(*id),
        }
    }

    /// Perform the remote call for an intent
    async fn dispatch(&self, intent: &MutationIntent) -> Result<Option<Todo>, Error> {
        match intent {
            MutationIntent::Create(candidate) => Ok(Some(self.store.create(candidate).await?)),
            MutationIntent::Update { id, patch } => Ok(Some(self.store.update(*id, patch).await?)),
            MutationIntent::Delete { id } => {
                self.store.delete(*id).await?;
                Ok(None)
            }
        }
    }

    // The lock is held only for synchronous cache operations, never across
    // an await.
    fn cache(&self) -> MutexGuard<'_, ListCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
