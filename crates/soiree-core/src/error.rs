// Error types for the guest assistant

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors that can occur while handling a guest message
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Missing or invalid credential (API key, account SID)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Model API replied with an unexpected shape
    #[error("upstream format error: {0}")]
    UpstreamFormat(String),

    /// Database read/write failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Event or chat context does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure talking to an external service
    #[error("network error: {0}")]
    Network(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AssistantError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AssistantError::Configuration(msg.into())
    }

    /// Create an upstream format error
    pub fn upstream(msg: impl Into<String>) -> Self {
        AssistantError::UpstreamFormat(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        AssistantError::Storage(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        AssistantError::Network(msg.into())
    }

    /// Create a not-found error for an event
    pub fn event_not_found(event_id: Uuid) -> Self {
        AssistantError::NotFound(format!("event {event_id}"))
    }
}
