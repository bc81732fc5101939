//! Configuration options for the todo client

use std::time::Duration;

/// Configuration options for the todo client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Page size used when the caller does not pick one
    pub default_limit: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            default_limit: 10,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the default page size
    pub fn with_default_limit(mut self, value: u32) -> Self {
        self.default_limit = value;
        self
    }
}
