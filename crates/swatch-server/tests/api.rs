use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use swatch_server::{router, AppState, ServerConfig};

fn app() -> Router {
    router(Arc::new(AppState::new(&ServerConfig::default())))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn renders_function_component() {
    let response = app()
        .oneshot(post_json(
            "/api/render",
            r#"{"code": "function Button() { return <button>Hi</button>; }"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let html = json_body(response).await["html"].as_str().unwrap().to_string();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("function App() { return <button>Hi<\\/button>; }"));
    assert!(html.contains(r#"<div id="root"></div>"#));
}

#[tokio::test]
async fn renders_fenced_markup_with_imports() {
    let code = "```tsx\nimport React from 'react';\n<div>Hello</div>\n```";
    let body = serde_json::json!({ "code": code }).to_string();

    let response = app().oneshot(post_json("/api/render", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let html = json_body(response).await["html"].as_str().unwrap().to_string();
    assert!(html.contains("const App = () => (<div>Hello<\\/div>);"));
    assert!(!html.contains("import React"));
    assert!(!html.contains("```"));
}

#[tokio::test]
async fn empty_code_is_rejected() {
    let response = app()
        .oneshot(post_json("/api/render", r#"{"code": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_input");
    assert!(body.get("html").is_none());
}

#[tokio::test]
async fn missing_or_ill_typed_code_is_rejected() {
    for body in [r#"{}"#, r#"{"code": 7}"#, r#"{"source": "<p />"}"#] {
        let response = app().oneshot(post_json("/api/render", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json_body(response).await["error"], "invalid_input");
    }
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let response = app()
        .oneshot(post_json("/api/render", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_input");
}

#[tokio::test]
async fn normalize_reports_entry_and_warnings() {
    let response = app()
        .oneshot(post_json(
            "/api/normalize",
            r#"{"code": "const Card = () => <div />;\nconst Badge = () => <span />;"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["entry"], "constant");
    assert_eq!(body["original_name"], "Card");
    assert!(body["code"].as_str().unwrap().starts_with("const App = () => <div />;"));
    assert_eq!(body["warnings"][0]["kind"], "ambiguous_entry");
    assert_eq!(body["warnings"][0]["others"][0], "Badge");
}

#[tokio::test]
async fn playground_embeds_sandboxed_frame() {
    let response = app()
        .oneshot(Request::builder().uri("/playground").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(html.contains(r#"<iframe id="preview""#));
    assert!(html.contains(r#"sandbox="allow-scripts""#));
    assert!(!html.contains("allow-same-origin"));
    assert!(html.contains("window.addEventListener('message', onMessage)"));
    assert!(!html.contains("new WebSocket"));
}

#[tokio::test]
async fn playground_shows_watched_snippet() {
    let temp = tempfile::tempdir().unwrap();
    let snippet = temp.path().join("card.tsx");
    std::fs::write(&snippet, "export default function Card() { return <div>Card</div>; }").unwrap();

    let config = ServerConfig {
        watch: Some(snippet),
        ..Default::default()
    };
    let app = router(Arc::new(AppState::new(&config)));

    let response = app
        .oneshot(Request::builder().uri("/playground").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(html.contains("Watching <code>card.tsx</code>"));
    assert!(html.contains("export default function Card()"));
    assert!(html.contains("location.host + '/__reload'"));
}
