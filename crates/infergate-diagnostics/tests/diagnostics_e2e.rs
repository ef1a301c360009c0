//! Full diagnostic runs against a mocked OpenAI-compatible gateway.

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infergate_core::EndpointConfig;
use infergate_diagnostics::{run_diagnostics, DiagnosticOptions, Stage, Verdict};

fn text_reply(content: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn tool_call_reply() -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_0",
                    "type": "function",
                    "function": {
                        "name": "test_search",
                        "arguments": "{\"query\":\"predictive maintenance\"}"
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

/// A unit-ish vector of `dims` pointing along axis `axis`.
fn embedding(dims: usize, axis: usize) -> Value {
    let mut v = vec![0.0_f32; dims];
    v[axis] = 1.0;
    v[2] += 0.2;
    json!({ "data": [{ "embedding": v, "index": 0 }] })
}

async fn mount_chat(server: &MockServer, with_tools: Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"tools\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(with_tools))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello, I am working.")))
        .mount(server)
        .await;
}

async fn mount_embeddings(server: &MockServer, dims: usize) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_string_contains("weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding(dims, 1)))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding(dims, 0)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn healthy_gateway_passes_every_stage() {
    let server = MockServer::start().await;
    mount_chat(&server, tool_call_reply()).await;
    mount_embeddings(&server, 1024).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    for result in report.results() {
        assert_eq!(result.verdict, Verdict::Pass, "{}: {}", result.name(), result.detail);
    }
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn text_only_model_is_limited_not_failed() {
    let server = MockServer::start().await;
    mount_chat(&server, text_reply("I would search for that.")).await;
    mount_embeddings(&server, 1024).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    assert_eq!(report.verdict(Stage::ChatReachability), Some(Verdict::Pass));
    assert_eq!(report.verdict(Stage::ToolCalling), Some(Verdict::Limited));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn gateway_rejecting_tool_requests_is_limited_not_failed() {
    let server = MockServer::start().await;
    // Tool-bound requests get a 400; plain chat still answers.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"tools\""))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("tool calling is not enabled for this deployment"),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello, I am working.")))
        .mount(&server)
        .await;
    mount_embeddings(&server, 1024).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    let tool = report.get(Stage::ToolCalling).unwrap();
    assert_eq!(tool.verdict, Verdict::Limited);
    assert!(tool.detail.contains("400"));
    assert!(!tool.hints.is_empty());
    assert_eq!(report.verdict(Stage::ChatReachability), Some(Verdict::Pass));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn smaller_embeddings_warn_about_dimensions() {
    let server = MockServer::start().await;
    mount_chat(&server, tool_call_reply()).await;
    mount_embeddings(&server, 768).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    let embedding = report.get(Stage::EmbeddingGeneration).unwrap();
    assert_eq!(embedding.verdict, Verdict::Warn);
    assert!(embedding.detail.contains("768"));
    assert!(embedding.hints.iter().any(|h| h.contains("1024")));
    assert_eq!(report.verdict(Stage::SemanticSimilarity), Some(Verdict::Pass));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn unreachable_chat_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;
    mount_embeddings(&server, 1024).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    let chat = report.get(Stage::ChatReachability).unwrap();
    assert_eq!(chat.verdict, Verdict::Fail);
    assert!(chat.detail.contains("404"));
    assert!(!chat.hints.is_empty());
    assert_eq!(report.verdict(Stage::EmbeddingGeneration), Some(Verdict::Pass));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn missing_embeddings_endpoint_fails_the_run() {
    let server = MockServer::start().await;
    mount_chat(&server, tool_call_reply()).await;

    let report = run_diagnostics(&EndpointConfig::new(server.uri()), DiagnosticOptions::default())
        .await
        .unwrap();

    assert_eq!(report.verdict(Stage::EmbeddingGeneration), Some(Verdict::Fail));
    assert_eq!(report.verdict(Stage::SemanticSimilarity), Some(Verdict::Fail));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn bearer_token_reaches_both_endpoints() {
    let server = MockServer::start().await;
    mount_chat(&server, tool_call_reply()).await;
    mount_embeddings(&server, 1024).await;

    let config = EndpointConfig::new(server.uri()).with_api_key(Some("nvapi-test".into()));
    run_diagnostics(&config, DiagnosticOptions::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 6);
    for request in requests {
        let auth = request.headers.get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer nvapi-test");
    }
}

#[tokio::test]
async fn invalid_config_runs_nothing() {
    let err = run_diagnostics(&EndpointConfig::new("ftp://gateway"), DiagnosticOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.field, "baseUrl");
}
