//! Remote store client for the todo resource contract

mod types;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::model::{NewTodo, PageKey, Todo, TodoPatch};

pub use types::*;

const CLIENT_INFO: &str = concat!("todo-sync/", env!("CARGO_PKG_VERSION"));

/// Typed interface over the remote CRUD store.
///
/// Each operation performs exactly one request/response exchange. There is no
/// internal retry and no local error recovery; every failure surfaces to the
/// caller as a typed [`Error`].
#[async_trait]
pub trait TodoStore {
    /// Create a new entry from a client-assigned candidate
    async fn create(&self, candidate: &NewTodo) -> Result<Todo, Error>;

    /// Fetch a single entry by id
    async fn fetch(&self, id: Uuid) -> Result<Todo, Error>;

    /// Apply a partial update to the entry with the given id
    async fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<Todo, Error>;

    /// Delete the entry with the given id, returning the server's
    /// confirmation message. A second delete of the same id fails with
    /// [`Error::NotFound`].
    async fn delete(&self, id: Uuid) -> Result<String, Error>;

    /// List one page of entries together with the store-wide total.
    /// An empty result is not an error.
    async fn list(&self, key: PageKey) -> Result<(Vec<Todo>, u64), Error>;
}

/// HTTP implementation of [`TodoStore`]
pub struct HttpTodoStore {
    /// The base URL of the todo service
    base_url: String,

    /// HTTP client
    client: Client,

    /// Client options
    options: ClientOptions,
}

impl HttpTodoStore {
    /// Create a new HttpTodoStore
    pub(crate) fn new(base_url: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            options,
        }
    }

    /// URL of the collection resource
    fn collection_url(&self) -> String {
        format!("{}/todo", self.base_url)
    }

    /// URL of a single entry resource
    fn entry_url(&self, id: Uuid) -> String {
        format!("{}/todo/{}", self.base_url, id)
    }
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    async fn create(&self, candidate: &NewTodo) -> Result<Todo, Error> {
        debug!("create entry {}", candidate.id);
        let response: TodoResponse = Fetch::post(&self.client, &self.collection_url())
            .header("X-Client-Info", CLIENT_INFO)
            .timeout(self.options.request_timeout)
            .json(candidate)?
            .execute()
            .await?;
        Ok(response.todo_entry)
    }

    async fn fetch(&self, id: Uuid) -> Result<Todo, Error> {
        debug!("fetch entry {}", id);
        let response: TodoResponse = Fetch::get(&self.client, &self.entry_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .timeout(self.options.request_timeout)
            .execute()
            .await?;
        Ok(response.todo_entry)
    }

    async fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<Todo, Error> {
        debug!("update entry {}", id);
        let response: TodoResponse = Fetch::put(&self.client, &self.entry_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .timeout(self.options.request_timeout)
            .json(patch)?
            .execute()
            .await?;
        Ok(response.todo_entry)
    }

    async fn delete(&self, id: Uuid) -> Result<String, Error> {
        debug!("delete entry {}", id);
        let response: DeleteTodoResponse = Fetch::delete(&self.client, &self.entry_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .timeout(self.options.request_timeout)
            .execute()
            .await?;
        Ok(response.message)
    }

    async fn list(&self, key: PageKey) -> Result<(Vec<Todo>, u64), Error> {
        debug!("list page {} (limit {})", key.page, key.limit);
        let mut params = HashMap::new();
        params.insert("limit".to_string(), key.limit.to_string());
        params.insert("page".to_string(), key.page.to_string());

        let response: ListTodosResponse = Fetch::get(&self.client, &self.collection_url())
            .header("X-Client-Info", CLIENT_INFO)
            .timeout(self.options.request_timeout)
            .query(params)
            .execute()
            .await?;
        Ok((response.todo_entries, response.results))
    }
}
