//! Wire types for the todo resource contract

use serde::Deserialize;

use crate::model::Todo;

/// Envelope around a single entry, returned by create, get-one, and update
#[derive(Debug, Clone, Deserialize)]
pub struct TodoResponse {
    pub success: bool,
    pub todo_entry: Todo,
}

/// Envelope around one page of entries
#[derive(Debug, Clone, Deserialize)]
pub struct ListTodosResponse {
    pub success: bool,

    /// Total number of entries in the store, not just on this page
    #[serde(default)]
    pub results: u64,

    pub todo_entries: Vec<Todo>,
}

/// Envelope confirming a delete
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTodoResponse {
    pub success: bool,
    pub message: String,
}
