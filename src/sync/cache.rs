//! Page-scoped list cache with optimistic mutation and rollback

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::model::{PageKey, Todo, TodoPatch};

/// One page of entries plus the store-wide total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Entries in display order
    pub entries: Vec<Todo>,

    /// Total number of entries in the store, across all pages
    pub total: u64,
}

/// Opaque capture of a pre-mutation snapshot, good for exactly one rollback.
///
/// [`ListCache::rollback`] consumes the token by value, so rolling the same
/// mutation back twice does not compile.
#[derive(Debug)]
pub struct RollbackToken {
    snapshot: Snapshot,
}

/// In-memory view of the current page of todos.
///
/// The cache accepts optimistic mutations ahead of remote confirmation and
/// hands back a [`RollbackToken`] for each, so a failed remote call can
/// restore the exact pre-mutation state. When several mutations are pending
/// against the same snapshot, their tokens must be rolled back in LIFO order.
#[derive(Debug)]
pub struct ListCache {
    key: PageKey,
    snapshot: Snapshot,
    refresh_generation: u64,
}

impl ListCache {
    /// Create an empty cache for one page
    pub fn new(key: PageKey) -> Self {
        Self {
            key,
            snapshot: Snapshot::default(),
            refresh_generation: 0,
        }
    }

    /// The page this cache represents
    pub fn key(&self) -> PageKey {
        self.key
    }

    /// Entries in display order
    pub fn entries(&self) -> &[Todo] {
        &self.snapshot.entries
    }

    /// Store-wide entry count as of the last refresh or optimistic mutation
    pub fn total(&self) -> u64 {
        self.snapshot.total
    }

    /// A copy of the current snapshot, for rendering
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Prepend an entry and bump the total
    pub fn apply_insert(&mut self, todo: Todo) -> RollbackToken {
        let token = self.capture();
        self.snapshot.entries.insert(0, todo);
        self.snapshot.total += 1;
        token
    }

    /// Remove the entry with the given id and decrement the total.
    ///
    /// Returns `None` without touching the cache when the id is not on this
    /// page.
    pub fn apply_remove(&mut self, id: Uuid) -> Option<RollbackToken> {
        let position = self.snapshot.entries.iter().position(|e| e.id == id)?;
        let token = self.capture();
        self.snapshot.entries.remove(position);
        self.snapshot.total = self.snapshot.total.saturating_sub(1);
        Some(token)
    }

    /// Patch the entry with the given id in place, stamping a fresh
    /// `updated_at`. The total is unchanged.
    ///
    /// Returns `None` without touching the cache when the id is not on this
    /// page.
    pub fn apply_update(&mut self, id: Uuid, patch: &TodoPatch) -> Option<RollbackToken> {
        let position = self.snapshot.entries.iter().position(|e| e.id == id)?;
        let token = self.capture();
        let entry = &mut self.snapshot.entries[position];
        if let Some(title) = &patch.title {
            entry.title = title.clone();
        }
        if let Some(description) = &patch.description {
            entry.description = description.clone();
        }
        if let Some(done) = patch.done {
            entry.done = done;
        }
        entry.updated_at = Some(Utc::now());
        Some(token)
    }

    /// Restore the exact snapshot captured before the mutation
    pub fn rollback(&mut self, token: RollbackToken) {
        self.snapshot = token.snapshot;
    }

    /// Mark the start of an authoritative refetch, invalidating any that are
    /// still in flight
    pub fn begin_refresh(&mut self) -> u64 {
        self.refresh_generation += 1;
        self.refresh_generation
    }

    /// Replace the snapshot wholesale with the server's page.
    ///
    /// Returns `false` and leaves the cache untouched when a newer refetch
    /// has started since `generation` was handed out; the stale response must
    /// not overwrite fresher state.
    pub fn complete_refresh(&mut self, generation: u64, entries: Vec<Todo>, total: u64) -> bool {
        if generation != self.refresh_generation {
            warn!(
                "discarding stale list response for page {} (limit {})",
                self.key.page, self.key.limit
            );
            return false;
        }
        self.snapshot = Snapshot { entries, total };
        true
    }

    fn capture(&self) -> RollbackToken {
        RollbackToken {
            snapshot: self.snapshot.clone(),
        }
    }
}
