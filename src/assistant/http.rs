// src/assistant/http.rs — reqwest client for the `/mcp/ask/*` endpoints

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{endpoint_path, AskRequest, Assistant};
use crate::history::ChatMode;
use crate::infra::errors::ChatError;

pub struct HttpAssistant {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

impl HttpAssistant {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl Assistant for HttpAssistant {
    async fn ask(&self, mode: ChatMode, request: AskRequest) -> Result<String, ChatError> {
        let operation = format!("ask/{mode}");
        let url = format!("{}{}", self.base_url, endpoint_path(mode));

        tracing::debug!(
            "Asking {} ({} history turns)",
            endpoint_path(mode),
            request.history.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::request(&operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatError::request(
                &operation,
                format!(
                    "HTTP {}: {}",
                    status,
                    crate::util::truncate_str(&error_body, 200)
                ),
            ));
        }

        let resp: AskResponse = response
            .json()
            .await
            .map_err(|e| ChatError::request(&operation, format!("Failed to parse response: {e}")))?;
        Ok(resp.answer)
    }
}
