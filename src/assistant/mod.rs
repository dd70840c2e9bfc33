// src/assistant/mod.rs — Inference backend client

pub mod http;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::history::{ChatMode, Message};
use crate::infra::errors::ChatError;
pub use http::HttpAssistant;

/// Answers a visitor's question given the conversation so far.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, mode: ChatMode, request: AskRequest) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

impl HistoryTurn {
    pub fn from_message(m: &Message) -> Self {
        Self {
            role: if m.is_user {
                TurnRole::User
            } else {
                TurnRole::Model
            },
            parts: vec![TextPart {
                text: m.content.clone(),
            }],
        }
    }
}

/// Conversation history in backend format. Config markers are not part of
/// the conversation and are left out.
pub fn history_from(messages: &[Message]) -> Vec<HistoryTurn> {
    messages
        .iter()
        .filter(|m| !m.is_config_marker())
        .map(HistoryTurn::from_message)
        .collect()
}

/// Endpoint path for a mode: `gemini` answers directly, anything else goes
/// through the tool-augmented pipeline.
pub fn endpoint_path(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Gemini => "/mcp/ask/gemini",
        _ => "/mcp/ask/mcp",
    }
}
