// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::history::{ChatMode, ChatModel};
use crate::infra::paths;

/// Environment override for the backend base URL.
pub const BACKEND_URL_ENV: &str = "SUPPORT_CHAT_BACKEND_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_seconds: 120,
        }
    }
}

impl BackendConfig {
    /// Whether the backend runs on this machine. The visitor id record is
    /// only marked secure outside local development.
    pub fn is_local(&self) -> bool {
        match url::Url::parse(&self.base_url) {
            Ok(u) => matches!(
                u.host_str(),
                Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
            ),
            Err(_) => false,
        }
    }
}

/// How a model/mode change is written back to the history service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSync {
    /// `PUT /chat-history/sessions/{id}/config`
    #[default]
    Direct,
    /// Append a hidden marker message instead (append-only stores).
    Sentinel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub default_model: ChatModel,
    pub default_mode: ChatMode,
    pub config_sync: ConfigSync,
    /// Overrides the built-in support persona prompt.
    pub system_instruction: Option<String>,
    pub apology_message: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_model: ChatModel::Gemini,
            default_mode: ChatMode::Mcp,
            config_sync: ConfigSync::Direct,
            system_instruction: None,
            apology_message: default_apology(),
        }
    }
}

fn default_apology() -> String {
    "I apologize, but I encountered an error. Could you please rephrase your question?".into()
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url.trim().to_string();
            }
        }
    }
}
