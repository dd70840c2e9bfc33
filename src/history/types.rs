// src/history/types.rs — Chat session records as exchanged with the history service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Content of the hidden message that records a model/mode change.
pub const CONFIG_UPDATE_MARKER: &str = "__CONFIG_UPDATE__";

/// Title sent when the visitor clears a session name.
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ChatModel {
    #[serde(rename = "gemini")]
    #[value(name = "gemini")]
    Gemini,
    #[serde(rename = "gpt-3.5-turbo")]
    #[value(name = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    #[value(name = "gpt-4")]
    Gpt4,
}

impl ChatModel {
    pub const ALL: [ChatModel; 3] = [ChatModel::Gemini, ChatModel::Gpt35Turbo, ChatModel::Gpt4];

    pub fn id(&self) -> &'static str {
        match self {
            ChatModel::Gemini => "gemini",
            ChatModel::Gpt35Turbo => "gpt-3.5-turbo",
            ChatModel::Gpt4 => "gpt-4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatModel::Gemini => "Gemini Pro",
            ChatModel::Gpt35Turbo => "GPT-3.5 Turbo",
            ChatModel::Gpt4 => "GPT-4",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChatModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatModel::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown model '{s}' (expected gemini, gpt-3.5-turbo, gpt-4)"))
    }
}

/// Whether the backend answers directly (`gemini`) or through the
/// tool-augmented pipeline (`mcp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Gemini,
    Mcp,
}

impl ChatMode {
    pub const ALL: [ChatMode; 2] = [ChatMode::Mcp, ChatMode::Gemini];

    pub fn id(&self) -> &'static str {
        match self {
            ChatMode::Gemini => "gemini",
            ChatMode::Mcp => "mcp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatMode::Gemini => "Gemini Mode",
            ChatMode::Mcp => "MCP Mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChatMode::Gemini => "Direct model interaction for general queries",
            ChatMode::Mcp => "Knowledge-tool pipeline for product-specific answers",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatMode::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode '{s}' (expected gemini, mcp)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: ChatModel,
    pub mode: ChatMode,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: ChatModel::Gemini,
            mode: ChatMode::Mcp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            is_user,
            timestamp: now_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    /// Hidden marker recording a config change through the append-only message API.
    pub fn config_marker() -> Self {
        Self::new(CONFIG_UPDATE_MARKER, false)
    }

    pub fn is_config_marker(&self) -> bool {
        !self.is_user && self.content == CONFIG_UPDATE_MARKER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub config: ChatConfig,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds; drives most-recent-first ordering.
    pub updated: i64,
}

impl ChatSession {
    /// Title shown in session listings.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ if self.messages.is_empty() => "Loading title...",
            _ => "Untitled Chat",
        }
    }

    /// Messages meant for the reader, without config markers.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_config_marker())
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
