use thiserror::Error as ThisError;

///
/// PlatformError
///
/// Failure reported by a platform call. Only `Unavailable` is considered
/// transient and eligible for automatic read retries.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlatformError {
    #[error("platform unavailable: {message}")]
    Unavailable { message: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("record '{id}' not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("operation '{operation}' is not supported by this platform")]
    Unsupported { operation: String },
}

impl PlatformError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
