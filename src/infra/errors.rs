// src/infra/errors.rs — Error types for support-chat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    // Remote errors
    #[error("Request '{operation}' failed: {message}")]
    Request { operation: String, message: String },

    #[error("Session '{session_id}' not found")]
    NotFound { session_id: String },

    #[error("Session '{session_id}' is no longer in the session list")]
    StaleCache { session_id: String },

    // Controller guards
    #[error("Visitor identity has not been resolved yet")]
    IdentityNotLoaded,

    #[error("No active chat session")]
    NoActiveSession,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatError {
    pub fn request(operation: &str, message: impl Into<String>) -> Self {
        ChatError::Request {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Whether the referenced session is gone, either server-side or from the local cache.
    pub fn is_missing_session(&self) -> bool {
        matches!(
            self,
            ChatError::NotFound { .. } | ChatError::StaleCache { .. }
        )
    }
}
