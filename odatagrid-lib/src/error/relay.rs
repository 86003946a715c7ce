//! Relay error types

/// Errors that can occur while running the cross-origin relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to bind the listening socket.
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    /// The upstream request failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The relay configuration is unusable.
    #[error("Invalid relay configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Creates a new bind error.
    pub fn bind(addr: impl ToString, message: impl Into<String>) -> Self {
        Self::Bind {
            addr: addr.to_string(),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
