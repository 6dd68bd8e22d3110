//! Error taxonomy for statistics resolution.

/// Maximum number of characters of a raw response body kept for diagnostics.
pub const EXCERPT_CHARS: usize = 200;

/// Errors produced while fetching or decoding either statistics source.
///
/// Excerpts are for developer logs only and never reach a presenter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {detail}")]
    Network { detail: String },

    #[error("unexpected HTTP status {status}")]
    Status { status: u16, excerpt: String },

    #[error("malformed response body: {detail}")]
    Parse { detail: String, excerpt: String },
}

impl FetchError {
    pub fn network(detail: impl std::fmt::Display) -> Self {
        FetchError::Network {
            detail: detail.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        FetchError::Status {
            status,
            excerpt: excerpt(body),
        }
    }

    pub fn parse(detail: impl std::fmt::Display, body: &str) -> Self {
        FetchError::Parse {
            detail: detail.to_string(),
            excerpt: excerpt(body),
        }
    }

    /// HTTP status code, when the failure was a non-200 response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body excerpt, when one was captured.
    pub fn excerpt(&self) -> Option<&str> {
        match self {
            FetchError::Status { excerpt, .. } | FetchError::Parse { excerpt, .. } => {
                Some(excerpt.as_str())
            }
            FetchError::Network { .. } => None,
        }
    }
}

/// Truncate `body` to at most [`EXCERPT_CHARS`] characters.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

/// Resolution-level outcomes that are not a plain success.
///
/// Every variant is handled inside the pipeline; none escapes to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("page does not identify a repository")]
    NoRepository,

    #[error("page is excluded from statistics: /{segment}")]
    ExcludedPage { segment: String },

    #[error("fast source unavailable: {0}")]
    FastSourceUnavailable(FetchError),

    #[error("fast source reported no languages")]
    EmptyResult,

    #[error("precise source unavailable: {0}")]
    PreciseSourceUnavailable(FetchError),
}

impl ResolveError {
    /// Whether the end user sees a message for this outcome.
    ///
    /// A precise-source failure only relabels the estimate.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ResolveError::FastSourceUnavailable(_) | ResolveError::EmptyResult
        )
    }

    /// The underlying fetch failure, if any.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            ResolveError::FastSourceUnavailable(e) | ResolveError::PreciseSourceUnavailable(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}
