use thiserror::Error;

/// Typed error hierarchy for scrollcheck.
///
/// Use at the collaborator boundary (channel listing, history fetches, posting) and for
/// configuration validation. Glue code can keep using `anyhow::Result`; the `Internal`
/// variant allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum ScrollError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Transient I/O error: {message}")]
    Transient {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Fatal I/O error: {0}")]
    Fatal(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using `ScrollError`.
pub type ScrollResult<T> = std::result::Result<T, ScrollError>;

impl ScrollError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Whether this error is transient and the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transient { .. } | Self::Internal(_) => true,
            Self::Permission(_) | Self::Config(_) | Self::Fatal(_) => false,
        }
    }

    /// Seconds the platform asked us to wait before retrying, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
