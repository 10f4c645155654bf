//! Request-scoped context handed to every storage call.
//!
//! The context is passed down to the backend untouched. The only thing it
//! carries today is an optional deadline.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    timeout: Option<Duration>,
}

impl RequestContext {
    /// A context without any deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
