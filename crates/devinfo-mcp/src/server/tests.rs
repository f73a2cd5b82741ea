// crates/devinfo-mcp/src/server/tests.rs
// ============================================================================
// Module: MCP Server Unit Tests
// Description: Router-level tests driven through tower's oneshot.
// Purpose: Validate routing, body limits, discovery auth, and audit emission.
// Dependencies: devinfo-mcp, devinfo-config, tower, tokio
// ============================================================================

//! ## Overview
//! Builds the router from in-memory configuration and sends single requests
//! without binding a socket.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::ORIGIN;
use devinfo_config::DevinfoConfig;
use serde_json::Value;
use serde_json::json;
use tower::ServiceExt;

use super::McpServer;
use super::McpServerError;
use crate::audit::McpAuditEvent;
use crate::audit::McpAuditSink;
use crate::telemetry::McpMethod;
use crate::telemetry::McpOutcome;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
struct RecordingAudit {
    /// Recorded request events.
    events: Mutex<Vec<McpAuditEvent>>,
}

impl McpAuditSink for RecordingAudit {
    fn record(&self, event: &McpAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Parses a config with audit disabled plus `extra` TOML.
fn config(extra: &str) -> DevinfoConfig {
    DevinfoConfig::from_toml(&format!("[server.audit]\nenabled = false\n{extra}")).unwrap()
}

/// Config requiring the test bearer token.
fn keyed() -> DevinfoConfig {
    config("[server.auth]\napi_key = \"secret\"\n")
}

/// Config running unauthenticated in development mode.
fn dev() -> DevinfoConfig {
    config("[dev]\nallow_unauthenticated = true\n")
}

/// Builds the router for `config` with the built-in tools.
fn router(config: DevinfoConfig) -> Router {
    McpServer::from_config(config).unwrap().router().unwrap()
}

/// Builds a JSON POST to the default RPC path.
fn rpc(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/rpc-endpoint")
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

/// Sends a request and decodes the JSON response body.
async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// SECTION: Construction Tests
// ============================================================================

#[test]
fn server_refuses_unauthenticated_config_without_dev_opt_in() {
    let result = McpServer::from_config(config(""));
    assert!(matches!(result, Err(McpServerError::Config(_))));
}

#[test]
fn invalid_cors_origin_fails_router_build() {
    let server =
        McpServer::from_config(config("[dev]\nallow_unauthenticated = true\n[server.cors]\nallow_origins = [\"bad\\norigin\"]\n"))
            .unwrap();
    assert!(matches!(server.router(), Err(McpServerError::Config(_))));
}

// ============================================================================
// SECTION: RPC Route Tests
// ============================================================================

#[tokio::test]
async fn rpc_tools_list_succeeds_in_dev_mode() {
    let (status, body) =
        send(router(dev()), rpc(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn rpc_requires_bearer_token_when_keyed() {
    let (status, body) =
        send(router(keyed()), rpc(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!(-32001));
    assert_eq!(body["id"], json!(1));
}

#[tokio::test]
async fn rpc_accepts_valid_bearer_token() {
    let mut request = rpc(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#);
    request.headers_mut().insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
    let (status, _) = send(router(keyed()), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rpc_rejects_oversized_body() {
    let router = router(config(
        "[dev]\nallow_unauthenticated = true\n[server]\nmax_body_bytes = 1024\n",
    ));
    let (status, body) = send(router, rpc(vec![b' '; 4096])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32600));
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn rpc_get_is_invalid_request() {
    let request = Request::builder().method(Method::GET).uri("/rpc-endpoint").body(Body::empty()).unwrap();
    let (status, body) = send(router(dev()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn default_config_serves_rpc_endpoint() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rpc-endpoint")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#))
        .unwrap();
    let (status, body) = send(router(dev()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(1));
    assert_eq!(body["result"]["tools"][0]["name"], json!("get-project-info"));
}

#[tokio::test]
async fn rpc_path_is_configurable() {
    let router = router(config(
        "[dev]\nallow_unauthenticated = true\n[server]\nrpc_path = \"/api/v1/mcp\"\n",
    ));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/mcp")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#))
        .unwrap();
    let (status, _) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/rpc-endpoint")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#))
        .unwrap();
    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// SECTION: Discovery Route Tests
// ============================================================================

#[tokio::test]
async fn unknown_route_is_method_not_found_envelope() {
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, body) = send(router(dev()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32601));
    assert_eq!(body["error"]["data"], json!({"path": "/nope"}));
}

#[tokio::test]
async fn health_is_public() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router(keyed()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["server"], json!("devinfo-mcp"));
}

#[tokio::test]
async fn root_lists_endpoints() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(router(dev()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["mcp"], json!("/rpc-endpoint - MCP protocol endpoint"));
}

#[tokio::test]
async fn tools_route_shares_auth_guard() {
    let request = Request::builder().uri("/tools").body(Body::empty()).unwrap();
    let (status, body) = send(router(keyed()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!(-32001));

    let request = Request::builder()
        .uri("/tools")
        .header(AUTHORIZATION, "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(keyed()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tools"][0]["name"], json!("get-project-info"));
    assert_eq!(body["tools"][0]["input_schema"]["type"], json!("object"));
}

#[tokio::test]
async fn post_on_health_is_invalid_request() {
    let request =
        Request::builder().method(Method::POST).uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router(dev()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32600));
}

// ============================================================================
// SECTION: Audit and CORS Tests
// ============================================================================

#[tokio::test]
async fn rpc_and_tools_requests_emit_one_audit_event_each() {
    let audit = Arc::new(RecordingAudit::default());
    let router = McpServer::from_config(keyed())
        .unwrap()
        .with_audit_sink(audit.clone())
        .router()
        .unwrap();
    let mut request = rpc(
        r#"{"jsonrpc":"2.0","id":"r1","method":"tools/call","params":{"name":"get-project-info","arguments":{"project_name":"node-api"}}}"#,
    );
    request.headers_mut().insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
    let (status, _) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    let request = Request::builder().uri("/tools").body(Body::empty()).unwrap();
    send(router.clone(), request).await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    send(router, request).await;

    let events = audit.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].request_id.as_deref(), Some("r1"));
    assert_eq!(events[0].method, McpMethod::ToolsCall);
    assert_eq!(events[0].tool.as_deref(), Some("get-project-info"));
    assert_eq!(events[0].outcome, McpOutcome::Ok);
    assert!(events[0].token_fingerprint.is_some());
    assert_eq!(events[1].path, "/tools");
    assert_eq!(events[1].http_status, 401);
    assert_eq!(events[1].error_kind, Some("unauthorized"));
}

#[tokio::test]
async fn cors_headers_follow_configured_origins() {
    let router = router(config(
        "[dev]\nallow_unauthenticated = true\n[server.cors]\nallow_origins = [\"https://app.example\"]\n",
    ));
    let request = Request::builder()
        .uri("/health")
        .header(ORIGIN, "https://app.example")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|value| value.to_str().ok()),
        Some("https://app.example")
    );
}

#[tokio::test]
async fn cors_is_off_without_origins() {
    let request = Request::builder()
        .uri("/health")
        .header(ORIGIN, "https://app.example")
        .body(Body::empty())
        .unwrap();
    let response = router(dev()).oneshot(request).await.unwrap();
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
