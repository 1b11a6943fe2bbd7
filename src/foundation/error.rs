use std::fmt;

/// Convenience result type used across the relay.
pub type RelayResult<T> = Result<T, RelayError>;

/// Which caller-supplied value failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputField {
    /// The work id (`work` / `pid`).
    Work,
    /// The page index (`page`).
    Page,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Work => "work id",
            Self::Page => "page",
        })
    }
}

/// Top-level error taxonomy used by resolver, proxy and reconstruction APIs.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// Caller-supplied data failed validation.
    #[error("invalid input ({field}): {reason}")]
    InvalidInput {
        /// Which value was rejected.
        field: InputField,
        /// What is wrong with it.
        reason: String,
    },

    /// The requested page does not exist for this work.
    #[error("page {page} out of range (work has {len} pages)")]
    PageOutOfRange {
        /// Requested zero-based page.
        page: usize,
        /// Number of pages the work actually has.
        len: usize,
    },

    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned {status} for {url}")]
    UpstreamStatus {
        /// HTTP status code returned by upstream.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Upstream answered but refused the lookup (API-level error flag).
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// Upstream could not be reached or returned an unusable payload.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The frame bundle is unreadable or lacks a requested entry.
    #[error("malformed bundle: {0}")]
    MalformedBundle(String),

    /// A frame could not be decoded as an image.
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(String),

    /// Input exceeds a configured resource limit.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The animation encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Work was abandoned because the caller went away.
    #[error("cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RelayError {
    /// Build a [`RelayError::InvalidInput`] value.
    pub fn invalid_input(field: InputField, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Build a [`RelayError::UpstreamUnavailable`] value.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Build a [`RelayError::MalformedBundle`] value.
    pub fn malformed_bundle(msg: impl Into<String>) -> Self {
        Self::MalformedBundle(msg.into())
    }

    /// Build a [`RelayError::UnsupportedFrame`] value.
    pub fn unsupported_frame(msg: impl Into<String>) -> Self {
        Self::UnsupportedFrame(msg.into())
    }

    /// Build a [`RelayError::LimitExceeded`] value.
    pub fn limit(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    /// Build a [`RelayError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// `true` when the caller is at fault and a retry with the same input cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::PageOutOfRange { .. } | Self::LimitExceeded(_)
        )
    }

    /// `true` for failures reported by, or while talking to, the upstream host.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. } | Self::UpstreamRejected(_) | Self::UpstreamUnavailable(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
