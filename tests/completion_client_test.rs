use serde_json::json;
use travel_advisor::{build_envelope, ChatMessage, CompletionClient, CompletionConfig, FormSelection, SessionLog};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

fn client_for(server: &MockServer, api_key: Option<&str>) -> CompletionClient {
    let config = CompletionConfig::from_api_key(api_key.map(str::to_string))
        .with_api_url(format!("{}{}", server.uri(), COMPLETIONS_PATH));
    CompletionClient::new(config)
}

fn envelope() -> Vec<ChatMessage> {
    build_envelope(
        &SessionLog::new(),
        &FormSelection::new("Beach", "Europe", vec!["Romantic".to_string()]),
    )
}

#[test_log::test(tokio::test)]
async fn test_success_returns_trimmed_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": " Paris is lovely. "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("gsk_test")).complete(&envelope()).await;
    assert_eq!(reply, "Paris is lovely.");
}

#[tokio::test]
async fn test_request_carries_bearer_model_and_temperature() {
    let server = MockServer::start().await;
    let messages = envelope();
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer gsk_test"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "model": "llama3-8b-8192",
            "temperature": 0.7,
            "messages": messages,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("gsk_test")).complete(&messages).await;
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn test_missing_credential_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let reply = client_for(&server, None).complete(&envelope()).await;
    assert_eq!(
        reply,
        "🚫 GROQ_API_KEY is missing or invalid. Please check your environment."
    );

    let malformed = client_for(&server, Some("sk-not-groq")).complete(&envelope()).await;
    assert_eq!(reply, malformed);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("gsk_test")).complete(&envelope()).await;
    assert!(reply.contains("429"));
    assert!(reply.contains("rate limited"));
    assert!(reply.starts_with("❌"));
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("gsk_test")).complete(&envelope()).await;
    assert!(reply.starts_with("⚠️ Failed to call GROQ API:"));
}

#[tokio::test]
async fn test_empty_choices_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("gsk_test")).complete(&envelope()).await;
    assert!(reply.starts_with("⚠️ Failed to call GROQ API:"));
    assert!(reply.contains("no choices"));
}

#[tokio::test]
async fn test_connection_failure_is_reported() {
    // Nothing listens on port 1.
    let config = CompletionConfig::from_api_key(Some("gsk_test".to_string()))
        .with_api_url("http://127.0.0.1:1/openai/v1/chat/completions");
    let reply = CompletionClient::new(config).complete(&envelope()).await;
    assert!(reply.starts_with("⚠️ Failed to call GROQ API:"));
}
