//! HTTP assistant tests against a local relay served by axum.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use dbtchat_assistant::HttpAssistant;
use dbtchat_core::assistant::Assistant;
use dbtchat_core::error::GatewayError;
use serde_json::{Value, json};
use std::time::Duration;

/// Serve `app` on an ephemeral port and return the prompt endpoint URL.
async fn spawn_relay(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/prompt")
}

fn assistant(url: &str) -> HttpAssistant {
    HttpAssistant::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn successful_answer_is_normalized() {
    let app = Router::new().route(
        "/prompt",
        post(|Json(body): Json<Value>| async move {
            let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "returncode": 0,
                "stdout": format!("\x1b[32m> echo: {prompt} &amp; more\x1b[0m\n"),
                "stderr": ""
            }))
        }),
    );
    let url = spawn_relay(app).await;

    let answer = assistant(&url).invoke("hello").await.unwrap();
    assert_eq!(answer, "echo: hello & more");
}

#[tokio::test]
async fn nonzero_exit_surfaces_stderr() {
    let app = Router::new().route(
        "/prompt",
        post(|| async { Json(json!({"returncode": 1, "stdout": "", "stderr": "model overloaded"})) }),
    );
    let url = spawn_relay(app).await;

    let err = assistant(&url).invoke("q").await.unwrap_err();
    assert_eq!(err.to_string(), "Error: model overloaded");
}

#[tokio::test]
async fn error_status_is_http_error() {
    let app = Router::new().route(
        "/prompt",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let url = spawn_relay(app).await;

    let err = assistant(&url).invoke("q").await.unwrap_err();
    assert_eq!(err, GatewayError::HttpError { status: 502 });
    assert_eq!(err.to_string(), "HTTP Error: 502");
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let app = Router::new().route("/prompt", post(|| async { "not json" }));
    let url = spawn_relay(app).await;

    let err = assistant(&url).invoke("q").await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse(_)));
}

#[tokio::test]
async fn slow_relay_times_out() {
    let app = Router::new().route(
        "/prompt",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"returncode": 0, "stdout": "late"}))
        }),
    );
    let url = spawn_relay(app).await;

    let slow = HttpAssistant::new(&url, Duration::from_millis(200)).unwrap();
    let err = slow.invoke("q").await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = assistant(&format!("http://{addr}/prompt"))
        .invoke("q")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unreachable { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "Error: the assistant is unreachable");
}
