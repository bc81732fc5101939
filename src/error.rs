//! Error handling for the todo service client

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for the todo service client
#[derive(Error, Debug)]
pub enum Error {
    /// Field content rejected by the client or the server
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation targets an id absent from the store
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure, unparseable response, or an unrecognized non-2xx status
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new transport error
    pub fn transport<T: fmt::Display>(msg: T) -> Self {
        Error::Transport(msg.to_string())
    }

    /// Classify a non-2xx response, carrying the server's `detail` text.
    pub(crate) fn from_status(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::Validation(detail)
            }
            _ => Error::Transport(format!("{}: {}", status, detail)),
        }
    }

    /// Whether this error is the validation category
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether this error is the not-found category
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Whether this error is the transport category
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Transport(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Transport(format!("URL error: {}", err))
    }
}
