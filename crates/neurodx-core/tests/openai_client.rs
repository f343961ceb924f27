//! Integration tests for OpenAiClient.
//!
//! Uses wiremock for HTTP mocking. Covers the request shape, bearer auth,
//! error body extraction, timeouts and malformed responses.

use neurodx_core::{
    first_choice_text, ChatCompletionRequest, CompletionClient, CompletionConfig, DiagnoseError,
    ErrorKind, OpenAiClient, SYSTEM_PROMPT,
};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> OpenAiClient {
    let config = CompletionConfig::default()
        .with_base_url(mock_server.uri())
        .with_api_key("test-key")
        .with_timeout_secs(5);
    OpenAiClient::new(config).expect("failed to create client")
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
    })
}

#[tokio::test]
async fn test_create_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": "the prompt"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Parkinson's")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let response = client
        .create(&ChatCompletionRequest::diagnosis("the prompt"))
        .await
        .expect("create failed");

    assert_eq!(first_choice_text(&response).unwrap(), "Parkinson's");
    assert_eq!(response.id.as_deref(), Some("chatcmpl-123"));
}

#[tokio::test]
async fn test_error_message_taken_from_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("Incorrect API key provided"), "{err}");
    match err {
        DiagnoseError::Upstream { status, .. } => assert_eq!(status, Some(401)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("upstream overloaded"), "{err}");
}

#[tokio::test]
async fn test_non_json_success_body_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_empty_choices_decodes_then_fails_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let response = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .expect("empty choices still decode");

    let err = first_choice_text(&response).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn test_unreachable_server_is_upstream_error() {
    // Nothing listens on port 1; the connection is refused.
    let client = OpenAiClient::new(
        CompletionConfig::default()
            .with_base_url("http://127.0.0.1:1/v1")
            .with_api_key("test-key")
            .with_timeout_secs(2),
    )
    .unwrap();

    let err = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("completion request"), "{err}");
}

#[tokio::test]
async fn test_slow_response_times_out_as_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("Healthy"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(
        CompletionConfig::default()
            .with_base_url(mock_server.uri())
            .with_api_key("test-key")
            .with_timeout_secs(1),
    )
    .unwrap();

    let err = client
        .create(&ChatCompletionRequest::diagnosis("p"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("timed out"), "{err}");
}
