//! Fetch error types

/// Errors that can occur while fetching a page from the remote service.
///
/// [`FetchError::Cancelled`] is not a failure: it marks a request that was
/// superseded by a newer one and must be dropped without any visible effect.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request was superseded or cancelled before it could be applied.
    #[error("Request cancelled")]
    Cancelled,

    /// Network failure (DNS, connection refused, offline, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// Non-2xx HTTP response from the remote service.
    #[error("HTTP {status}: {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// The response body is not JSON at all.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl FetchError {
    /// Creates a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new HTTP status error.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns `true` if the request was superseded rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}
