// tests/http_store_test.rs — Integration test: HTTP clients against a mock backend

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support_chat::assistant::{history_from, AskRequest, Assistant, HttpAssistant};
use support_chat::history::{
    ChatConfig, ChatMode, ChatModel, ChatSession, HttpSessionStore, Message, SessionStore,
};
use support_chat::infra::errors::ChatError;

fn store_for(server: &MockServer) -> HttpSessionStore {
    HttpSessionStore::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn session_json(id: &str, title: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "messages": [
            { "id": "m1", "content": "How do I reset my license?", "isUser": true, "timestamp": 1000 },
            { "id": "m2", "content": "__CONFIG_UPDATE__", "isUser": false, "timestamp": 1500 },
            { "id": "m3", "content": "Open the license manager.", "isUser": false, "timestamp": 2000 }
        ],
        "config": { "model": "gpt-4", "mode": "gemini" },
        "created": 1000,
        "updated": 2000
    })
}

#[tokio::test]
async fn test_list_sessions_scoped_to_visitor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/sessions"))
        .and(query_param("userId", "visitor-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([session_json("b", Some("Licensing")), session_json("a", None)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sessions = store_for(&server).list_sessions("visitor-1").await.unwrap();

    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(sessions[0].display_title(), "Licensing");
    assert_eq!(sessions[1].title, None);
}

#[tokio::test]
async fn test_get_session_preserves_messages_and_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/sessions/s-42"))
        .and(query_param("userId", "visitor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-42", Some("T"))))
        .mount(&server)
        .await;

    let session = store_for(&server)
        .get_session("visitor-1", "s-42")
        .await
        .unwrap();

    assert_eq!(session.id, "s-42");
    let contents: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "How do I reset my license?",
            "__CONFIG_UPDATE__",
            "Open the license manager."
        ]
    );
    assert_eq!(
        session.config,
        ChatConfig {
            model: ChatModel::Gpt4,
            mode: ChatMode::Gemini,
        }
    );
    assert_eq!(session.visible_messages().count(), 2);

    // what we read is what we would write back
    let reparsed: ChatSession =
        serde_json::from_value(serde_json::to_value(&session).unwrap()).unwrap();
    assert_eq!(reparsed, session);
}

#[tokio::test]
async fn test_missing_session_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/sessions/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/chat-history/sessions/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.get_session("visitor-1", "gone").await.unwrap_err();
    assert!(matches!(err, ChatError::NotFound { ref session_id } if session_id == "gone"));
    assert!(err.is_missing_session());

    let err = store.delete_session("visitor-1", "gone").await.unwrap_err();
    assert!(err.is_missing_session());
}

#[tokio::test]
async fn test_server_error_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/sessions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = store_for(&server).list_sessions("visitor-1").await.unwrap_err();
    match err {
        ChatError::Request { operation, message } => {
            assert_eq!(operation, "list_sessions");
            assert!(message.contains("503"));
            assert!(message.contains("maintenance"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_session_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-history/sessions"))
        .and(body_json(json!({
            "userId": "visitor-1",
            "sessionId": "new-1",
            "title": null,
            "config": { "model": "gemini", "mode": "mcp" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-1",
            "title": null,
            "messages": [],
            "config": { "model": "gemini", "mode": "mcp" },
            "created": 5,
            "updated": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = store_for(&server)
        .create_session("visitor-1", "new-1", None, ChatConfig::default())
        .await
        .unwrap();
    assert_eq!(session.id, "new-1");
    assert!(session.messages.is_empty());
    assert_eq!(session.display_title(), "Loading title...");
}

#[tokio::test]
async fn test_append_message_body() {
    let server = MockServer::start().await;
    let message = Message::user("Is there a trial?");
    Mock::given(method("POST"))
        .and(path("/chat-history/sessions/s-1/messages"))
        .and(body_partial_json(json!({
            "userId": "visitor-1",
            "message": { "content": "Is there a trial?", "isUser": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-1", None)))
        .expect(1)
        .mount(&server)
        .await;

    let session = store_for(&server)
        .append_message("visitor-1", "s-1", &message)
        .await
        .unwrap();
    assert_eq!(session.id, "s-1");
}

#[tokio::test]
async fn test_blank_rename_sends_default_title() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/chat-history/sessions/s-1/title"))
        .and(body_json(json!({ "userId": "visitor-1", "title": "New Chat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-1", Some("New Chat"))))
        .expect(1)
        .mount(&server)
        .await;

    let session = store_for(&server)
        .rename_session("visitor-1", "s-1", "   ")
        .await
        .unwrap();
    assert_eq!(session.display_title(), "New Chat");
}

#[tokio::test]
async fn test_update_config_and_generate_title() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/chat-history/sessions/s-1/config"))
        .and(body_json(json!({
            "userId": "visitor-1",
            "config": { "model": "gpt-3.5-turbo", "mode": "gemini" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-1", None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat-history/generate-title"))
        .and(body_json(json!({
            "userId": "visitor-1",
            "sessionId": "s-1",
            "firstMessage": "Refund for a double charge"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Double charge refund" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store
        .update_config(
            "visitor-1",
            "s-1",
            ChatConfig {
                model: ChatModel::Gpt35Turbo,
                mode: ChatMode::Gemini,
            },
        )
        .await
        .unwrap();
    let title = store
        .generate_title("visitor-1", "s-1", "Refund for a double charge")
        .await
        .unwrap();
    assert_eq!(title, "Double charge refund");
}

#[tokio::test]
async fn test_assistant_routes_by_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/ask/gemini"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "direct" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mcp/ask/mcp"))
        .and(body_partial_json(json!({
            "sessionId": "s-1",
            "message": "and now?",
            "history": [
                { "role": "user", "parts": [{ "text": "first" }] },
                { "role": "model", "parts": [{ "text": "reply" }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "with tools" })))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = HttpAssistant::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let prior = vec![
        Message::user("first"),
        Message::config_marker(),
        Message::bot("reply"),
    ];

    let direct = assistant
        .ask(
            ChatMode::Gemini,
            AskRequest {
                session_id: "s-1".into(),
                message: "hello".into(),
                system_instruction: None,
                history: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(direct, "direct");

    let tooled = assistant
        .ask(
            ChatMode::Mcp,
            AskRequest {
                session_id: "s-1".into(),
                message: "and now?".into(),
                system_instruction: Some("Be brief.".into()),
                history: history_from(&prior),
            },
        )
        .await
        .unwrap();
    assert_eq!(tooled, "with tools");
}

#[tokio::test]
async fn test_assistant_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/ask/mcp"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let assistant = HttpAssistant::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let err = assistant
        .ask(
            ChatMode::Mcp,
            AskRequest {
                session_id: "s".into(),
                message: "q".into(),
                system_instruction: None,
                history: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Request { ref operation, .. } if operation == "ask/mcp"));
}
