// Unit tests for the Anthropic client
//
// Retry behavior is exercised against a local mock server; the backoff sleeps
// are real (1s + 2s), so the failure-path tests take a few seconds.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::AnthropicClient;
use soiree_core::{AssistantError, LlmClient};

fn reply_body(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "model": "claude-3-opus-20240229",
        "stop_reason": "end_turn"
    })
}

async fn client_for(server: &MockServer) -> AnthropicClient {
    AnthropicClient::with_base_url("test-key".to_string(), server.uri())
}

#[test]
fn from_env_without_key_is_a_configuration_error() {
    std::env::remove_var("ANTHROPIC_API_KEY");
    let err = AnthropicClient::from_env().unwrap_err();
    assert!(matches!(err, AssistantError::Configuration(_)));
}

#[tokio::test]
async fn sends_expected_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-opus-20240229",
            "max_tokens": 1024,
            "messages": [{ "role": "user", "content": "is there parking" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
            r#"{"response": "Yes, free lot B", "confidence": 0.9}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .await
        .generate("is there parking")
        .await
        .unwrap();
    assert_eq!(reply.response, "Yes, free lot B");
    assert_eq!(reply.confidence, 0.9);
}

#[tokio::test]
async fn plain_text_reply_wraps_with_default_confidence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_body("Parking is in lot B.")),
        )
        .mount(&server)
        .await;

    let reply = client_for(&server).await.generate("parking?").await.unwrap();
    assert_eq!(reply.response, "Parking is in lot B.");
    assert_eq!(reply.confidence, 0.8);
}

#[tokio::test]
async fn out_of_range_confidence_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
            r#"{"response": "certain", "confidence": 7.5}"#,
        )))
        .mount(&server)
        .await;

    let reply = client_for(&server).await.generate("q").await.unwrap();
    assert_eq!(reply.confidence, 1.0);
}

#[tokio::test]
async fn succeeds_on_second_attempt_without_a_third() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_body(r#"{"response": "ok", "confidence": 0.9}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).await.generate("q").await.unwrap();
    assert_eq!(reply.response, "ok");
}

#[tokio::test]
async fn gives_up_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server).await.generate("q").await.unwrap_err();
    assert!(matches!(err, AssistantError::Network(_)));
    assert!(err.to_string().contains("Overloaded"));
}

#[tokio::test]
async fn missing_content_is_an_upstream_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_test",
            "content": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).await.generate("q").await.unwrap_err();
    assert!(matches!(err, AssistantError::UpstreamFormat(_)));
}
