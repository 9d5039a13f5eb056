use thiserror::Error;

/// Ways a single location lookup can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Query was empty after trimming; no request is made.
    #[error("Location query is empty")]
    InvalidInput,

    /// The upstream service reported that no location matched.
    #[error("Location not found")]
    NotFound,

    /// Transport, status or body parsing failure.
    #[error("Weather request failed: {0}")]
    RequestFailed(String),
}

impl LookupError {
    pub(crate) fn request_failed(reason: impl Into<String>) -> Self {
        Self::RequestFailed(reason.into())
    }
}
