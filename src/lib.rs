//! Todo Service Client Library
//!
//! A Rust client library for a todo service, providing typed CRUD access to
//! the remote store and a client-side synchronization core: an optimistically
//! mutated page cache with rollback, driven by a per-view mutation
//! coordinator.

pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod store;
pub mod sync;

use reqwest::Client;

use crate::config::ClientOptions;
use crate::model::PageKey;
use crate::store::HttpTodoStore;
use crate::sync::MutationCoordinator;

/// The main entry point for the todo service client
pub struct TodoClient {
    /// The base URL of the todo service
    pub base_url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
}

impl TodoClient {
    /// Create a new TodoClient
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the todo service
    ///
    /// # Example
    ///
    /// ```
    /// use todo_sync::TodoClient;
    ///
    /// let client = TodoClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new TodoClient with custom options
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the todo service
    /// * `options` - Custom client options
    ///
    /// # Example
    ///
    /// ```
    /// use todo_sync::{TodoClient, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_default_limit(25);
    /// let client = TodoClient::new_with_options("http://localhost:8000", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
            options,
        }
    }

    /// Create a store client for CRUD operations against the service
    ///
    /// # Example
    ///
    /// ```
    /// use todo_sync::TodoClient;
    ///
    /// let client = TodoClient::new("http://localhost:8000");
    /// let store = client.store();
    /// ```
    pub fn store(&self) -> HttpTodoStore {
        HttpTodoStore::new(&self.base_url, self.http_client.clone(), self.options.clone())
    }

    /// A page key using the configured default page size
    pub fn page(&self, page: u32) -> PageKey {
        PageKey::new(self.options.default_limit, page)
    }

    /// Create a mutation coordinator for one page of todos.
    ///
    /// Build one per view scope at mount time and drop it at unmount; the
    /// coordinator owns the page's list cache for its whole lifetime.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_sync::TodoClient;
    ///
    /// let client = TodoClient::new("http://localhost:8000");
    /// let coordinator = client.coordinator(client.page(1));
    /// ```
    pub fn coordinator(&self, key: PageKey) -> MutationCoordinator<HttpTodoStore> {
        MutationCoordinator::new(self.store(), key)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::model::{NewTodo, PageKey, Todo, TodoPatch};
    pub use crate::store::TodoStore;
    pub use crate::sync::{MutationCoordinator, MutationIntent, MutationOutcome};
    pub use crate::TodoClient;
}
