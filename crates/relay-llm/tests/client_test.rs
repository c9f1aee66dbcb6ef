use mockito::Matcher;
use relay_llm::{ChatClient, ChatOptions, Message, RelayClient, RelayError, ReplySource};
use serde_json::json;
use std::time::Duration;

fn client_for(server: &mockito::ServerGuard) -> RelayClient {
    RelayClient::builder()
        .api_key("test-key")
        .base_url(server.url())
        .model("deepseek-r1")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_send_openai_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek-r1",
            "stream": false,
            "max_tokens": 500,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi there"}}],
                "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = vec![Message::system("be brief"), Message::user("Hello")];
    let reply = client_for(&server)
        .send(&messages, &ChatOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.content, "Hi there");
    assert_eq!(reply.source, ReplySource::Choices);
    assert_eq!(reply.usage.unwrap().completion_tokens, 2);
}

#[tokio::test]
async fn test_send_passes_option_overrides() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 42})))
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .create_async()
        .await;

    let reply = client_for(&server)
        .send(&[Message::user("x")], &ChatOptions::new().max_tokens(42))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.content, "ok");
    assert_eq!(reply.source, ReplySource::Response);
}

#[tokio::test]
async fn test_send_unknown_shape_is_low_confidence() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"data":[1,2]}"#)
        .create_async()
        .await;

    let reply = client_for(&server)
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap();

    assert!(reply.is_low_confidence());
    assert_eq!(reply.content, r#"{"data":[1,2]}"#);
}

#[tokio::test]
async fn test_upstream_json_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{ "error": { "message": "bad key" } }"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap_err();

    match &err {
        RelayError::Upstream { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, r#"{"error":{"message":"bad key"}}"#);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().starts_with("upstream API error (401)"));
}

#[tokio::test]
async fn test_upstream_text_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let err = client_for(&server)
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Upstream { status: 502, ref body } if body == "Bad Gateway"));
}

#[tokio::test]
async fn test_success_with_non_json_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Decode(_)));
}

#[tokio::test]
async fn test_transport_error() {
    let client = RelayClient::builder()
        .api_key("test-key")
        .base_url("http://127.0.0.1:1")
        .model("deepseek-r1")
        .build()
        .unwrap();

    let err = client
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    // accepts connections but never answers
    let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = silent.local_addr().unwrap();

    let client = RelayClient::builder()
        .api_key("test-key")
        .base_url(format!("http://{}", addr))
        .model("deepseek-r1")
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = client
        .send(&[Message::user("x")], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Transport(_)));
    assert!(err.is_timeout());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_list_models() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/models")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "deepseek-r1"}]}"#)
        .create_async()
        .await;

    let models = client_for(&server).list_models().await.unwrap();

    mock.assert_async().await;
    assert_eq!(models["data"][0]["id"], "deepseek-r1");
}

#[tokio::test]
async fn test_list_models_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/models")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let err = client_for(&server).list_models().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}
