// src/history/http.rs — reqwest client for the `/chat-history` endpoints

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{normalize_title, ChatConfig, ChatSession, Message, SessionStore};
use crate::infra::errors::ChatError;

pub struct HttpSessionStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionBody<'a> {
    user_id: &'a str,
    session_id: &'a str,
    title: Option<&'a str>,
    config: ChatConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendMessageBody<'a> {
    user_id: &'a str,
    message: &'a Message,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TitleBody<'a> {
    user_id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBody<'a> {
    user_id: &'a str,
    config: ChatConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTitleBody<'a> {
    user_id: &'a str,
    session_id: &'a str,
    first_message: &'a str,
}

#[derive(Deserialize)]
struct GeneratedTitle {
    title: String,
}

impl HttpSessionStore {
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

    fn sessions_url(&self) -> String {
        format!("{}/chat-history/sessions", self.base_url)
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/chat-history/sessions/{}", self.base_url, session_id)
    }

    /// Send a request and check the status. 404 maps to `NotFound` when a
    /// session id is given; every other non-2xx is a plain request failure.
    async fn execute(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, ChatError> {
        let response = request
            .send()
            .await
            .map_err(|e| ChatError::request(operation, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = session_id {
                return Err(ChatError::NotFound {
                    session_id: id.to_string(),
                });
            }
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatError::request(
                operation,
                format!("HTTP {}: {}", status, crate::util::truncate_str(&error_body, 200)),
            ));
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        session_id: Option<&str>,
    ) -> Result<T, ChatError> {
        let response = self.execute(operation, request, session_id).await?;
        response
            .json()
            .await
            .map_err(|e| ChatError::request(operation, format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, ChatError> {
        let req = self
            .client
            .get(self.sessions_url())
            .query(&[("userId", user_id)]);
        self.fetch_json("list_sessions", req, None).await
    }

    async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<ChatSession, ChatError> {
        let req = self
            .client
            .get(self.session_url(session_id))
            .query(&[("userId", user_id)]);
        self.fetch_json("get_session", req, Some(session_id)).await
    }

    async fn create_session(
        &self,
        user_id: &str,
        session_id: &str,
        title: Option<&str>,
        config: ChatConfig,
    ) -> Result<ChatSession, ChatError> {
        let req = self.client.post(self.sessions_url()).json(&CreateSessionBody {
            user_id,
            session_id,
            title,
            config,
        });
        self.fetch_json("create_session", req, None).await
    }

    async fn append_message(
        &self,
        user_id: &str,
        session_id: &str,
        message: &Message,
    ) -> Result<ChatSession, ChatError> {
        let req = self
            .client
            .post(format!("{}/messages", self.session_url(session_id)))
            .json(&AppendMessageBody { user_id, message });
        self.fetch_json("append_message", req, Some(session_id)).await
    }

    async fn rename_session(
        &self,
        user_id: &str,
        session_id: &str,
        title: &str,
    ) -> Result<ChatSession, ChatError> {
        let req = self
            .client
            .put(format!("{}/title", self.session_url(session_id)))
            .json(&TitleBody {
                user_id,
                title: normalize_title(title),
            });
        self.fetch_json("rename_session", req, Some(session_id)).await
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), ChatError> {
        let req = self
            .client
            .delete(self.session_url(session_id))
            .query(&[("userId", user_id)]);
        self.execute("delete_session", req, Some(session_id)).await?;
        Ok(())
    }

    async fn generate_title(
        &self,
        user_id: &str,
        session_id: &str,
        first_message: &str,
    ) -> Result<String, ChatError> {
        let req = self
            .client
            .post(format!("{}/chat-history/generate-title", self.base_url))
            .json(&GenerateTitleBody {
                user_id,
                session_id,
                first_message,
            });
        let generated: GeneratedTitle = self.fetch_json("generate_title", req, None).await?;
        Ok(generated.title)
    }

    async fn update_config(
        &self,
        user_id: &str,
        session_id: &str,
        config: ChatConfig,
    ) -> Result<ChatSession, ChatError> {
        let req = self
            .client
            .put(format!("{}/config", self.session_url(session_id)))
            .json(&ConfigBody { user_id, config });
        self.fetch_json("update_config", req, Some(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = HttpSessionStore::with_client("http://h:1/", reqwest::Client::new());
        assert_eq!(store.sessions_url(), "http://h:1/chat-history/sessions");
        assert_eq!(
            store.session_url("abc"),
            "http://h:1/chat-history/sessions/abc"
        );
    }

    #[test]
    fn test_create_body_shape() {
        let body = CreateSessionBody {
            user_id: "u",
            session_id: "s",
            title: None,
            config: ChatConfig::default(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "userId": "u",
                "sessionId": "s",
                "title": null,
                "config": { "model": "gemini", "mode": "mcp" }
            })
        );
    }
}
