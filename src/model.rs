//! Entity model and payload shapes for the todo service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Longest title the service accepts, in characters
pub const MAX_TITLE_LEN: usize = 255;

/// A single todo entry as stored by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    /// Client-generated v4 id, immutable after creation
    pub id: Uuid,

    /// Short text shown in the list; never empty once persisted
    pub title: String,

    /// Free-form text body
    #[serde(default)]
    pub description: String,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Stamped on every mutation; `None` before the first update
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Reserved for soft delete; no operation reads or writes it yet
    #[serde(default)]
    pub deleted: bool,

    /// Completion flag, mutated through update
    #[serde(default)]
    pub done: bool,
}

/// Create candidate.
///
/// The id is assigned client-side so the entry can be inserted into the list
/// cache before the server confirms it, and so a failed create can be retried
/// with the identical payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTodo {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTodo {
    /// Create a candidate with a fresh v4 id
    pub fn new(title: &str, description: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
        }
    }

    /// The entry shown in the cache until the server's copy arrives
    pub(crate) fn to_optimistic_entry(&self) -> Todo {
        Todo {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            created_at: Utc::now(),
            updated_at: None,
            deleted: false,
            done: false,
        }
    }
}

/// Partial update payload. Fields left `None` are omitted from the request
/// body and remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TodoPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, value: &str) -> Self {
        self.title = Some(value.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, value: &str) -> Self {
        self.description = Some(value.to_string());
        self
    }

    /// Set the completion flag
    pub fn with_done(mut self, value: bool) -> Self {
        self.done = Some(value);
        self
    }

    /// Whether the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.done.is_none()
    }
}

/// Identifies which slice of the collection a list call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub limit: u32,
    pub page: u32,
}

impl PageKey {
    /// Create a new page key
    pub fn new(limit: u32, page: u32) -> Self {
        Self { limit, page }
    }
}

/// Trim a title and check it against the service's field rules.
///
/// Returns the trimmed title, or a validation error when the result is empty
/// or longer than [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<String, Error> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(format!(
            "title must not exceed {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(trimmed.to_string())
}
