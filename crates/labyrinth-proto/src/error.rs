//! Error types for crawler capabilities.

/// Faults raised by an external crawler or inventory capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The crawler could not complete an operation (e.g. a remote round trip failed).
    #[error("crawler {operation} failed: {reason}")]
    Crawler {
        operation: &'static str,
        reason: String,
    },

    /// The crawler is no longer usable.
    #[error("crawler disconnected")]
    Disconnected,
}

impl Error {
    /// Creates a crawler fault for the named operation.
    pub fn crawler(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Crawler {
            operation,
            reason: reason.into(),
        }
    }
}

/// Result alias for capability operations.
pub type Result<T> = std::result::Result<T, Error>;
