//! Client-side synchronization between the list cache and the remote store

mod cache;
mod coordinator;

pub use cache::{ListCache, RollbackToken, Snapshot};
pub use coordinator::{MutationCoordinator, MutationIntent, MutationOutcome};
