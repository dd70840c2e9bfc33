// src/history/mod.rs — Chat history service client

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::infra::errors::ChatError;
pub use http::HttpSessionStore;
pub use types::{
    now_millis, ChatConfig, ChatMode, ChatModel, ChatSession, Message, CONFIG_UPDATE_MARKER,
    DEFAULT_TITLE,
};

/// Remote store of a visitor's chat sessions.
///
/// Every call carries the visitor id; sessions never record their owner
/// client-side. Only `list_sessions` and `get_session` are idempotent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Sessions ordered most-recent-first by the store.
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, ChatError>;

    async fn get_session(&self, user_id: &str, session_id: &str)
        -> Result<ChatSession, ChatError>;

    async fn create_session(
        &self,
        user_id: &str,
        session_id: &str,
        title: Option<&str>,
        config: ChatConfig,
    ) -> Result<ChatSession, ChatError>;

    async fn append_message(
        &self,
        user_id: &str,
        session_id: &str,
        message: &Message,
    ) -> Result<ChatSession, ChatError>;

    async fn rename_session(
        &self,
        user_id: &str,
        session_id: &str,
        title: &str,
    ) -> Result<ChatSession, ChatError>;

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), ChatError>;

    async fn generate_title(
        &self,
        user_id: &str,
        session_id: &str,
        first_message: &str,
    ) -> Result<String, ChatError>;

    async fn update_config(
        &self,
        user_id: &str,
        session_id: &str,
        config: ChatConfig,
    ) -> Result<ChatSession, ChatError>;
}

/// Title actually sent on rename: blank input falls back to [`DEFAULT_TITLE`].
pub fn normalize_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE
    } else {
        trimmed
    }
}
