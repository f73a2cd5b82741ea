// crates/devinfo-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: HTTP transport for the devinfo MCP dispatcher.
// Purpose: Expose the dispatcher and discovery routes via axum.
// Dependencies: devinfo-config, axum, tokio, tower-http, tracing
// ============================================================================

//! ## Overview
//! The server reads request bodies under a size limit, hands them to the
//! [`Dispatcher`], and serializes the resulting envelope. Discovery routes
//! (`GET /tools`, `GET /health`, `GET /`) sit beside the RPC endpoint;
//! `/tools` shares the dispatcher's [`AuthGuard`]. Every response is JSON,
//! including unknown routes and unreadable bodies. Each RPC and `/tools`
//! request produces one audit event.
//!
//! Security posture: inputs are untrusted; the server never echoes
//! credentials and runs without a secret only when configuration opts in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use devinfo_config::DevinfoConfig;
use devinfo_config::ServerCorsConfig;
use serde_json::Value;
use serde_json::json;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::McpFileAuditSink;
use crate::audit::McpNoopAuditSink;
use crate::audit::McpStderrAuditSink;
use crate::audit::SecurityAuditEvent;
use crate::audit::SecurityAuditEventParams;
use crate::auth::AuthGuard;
use crate::dispatcher::Dispatch;
use crate::dispatcher::Dispatcher;
use crate::registry::ToolRegistry;
use crate::response::DispatchError;
use crate::response::error_envelope;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::telemetry::NoopMetrics;
use crate::tools::builtin_registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Server name reported by discovery routes.
pub const SERVER_NAME: &str = "devinfo-mcp";
/// Server version reported by discovery routes.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Discovery route listing tools.
const TOOLS_PATH: &str = "/tools";
/// Discovery route for health checks.
const HEALTH_PATH: &str = "/health";

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: DevinfoConfig,
    /// Registered tools.
    registry: Arc<ToolRegistry>,
    /// Shared-secret guard.
    auth: AuthGuard,
    /// Audit sink for request events.
    audit: Arc<dyn McpAuditSink>,
    /// Metrics sink.
    metrics: Arc<dyn McpMetrics>,
}

impl McpServer {
    /// Builds a server with the built-in tools.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: DevinfoConfig) -> Result<Self, McpServerError> {
        let registry = builtin_registry().map_err(|err| McpServerError::Init(err.to_string()))?;
        Self::with_registry(config, registry)
    }

    /// Builds a server over a caller-supplied registry.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when configuration is invalid or the audit
    /// log cannot be opened.
    pub fn with_registry(
        config: DevinfoConfig,
        registry: ToolRegistry,
    ) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config)?;
        let auth = AuthGuard::new(config.server.auth.api_key.clone());
        if !auth.is_enabled() {
            audit.record_security(&SecurityAuditEvent::new(SecurityAuditEventParams {
                kind: "dev_mode_unauthenticated".to_string(),
                message: Some(
                    "serving without a shared secret; all requests are accepted".to_string(),
                ),
                auth_enabled: false,
                dev_mode: config.dev.allow_unauthenticated,
            }));
        }
        Ok(Self {
            config,
            registry: Arc::new(registry),
            auth,
            audit,
            metrics: Arc::new(NoopMetrics),
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn McpAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &DevinfoConfig {
        &self.config
    }

    /// Returns the registered tools.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Builds the axum router for all routes.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Config`] when a CORS origin is not a valid
    /// header value.
    pub fn router(&self) -> Result<Router, McpServerError> {
        let dispatcher = Dispatcher::new(Arc::clone(&self.registry), self.auth.clone())
            .with_call_timeout(self.config.server.tool_timeout())
            .with_metrics(Arc::clone(&self.metrics));
        let rpc_path = self.config.server.rpc_path.clone();
        let state = Arc::new(ServerState {
            dispatcher,
            audit: Arc::clone(&self.audit),
            max_body_bytes: self.config.server.max_body_bytes,
            rpc_path: rpc_path.clone(),
        });
        let app = Router::new()
            .route(&rpc_path, post(handle_rpc).fallback(handle_rpc_wrong_method))
            .route(TOOLS_PATH, get(handle_tools).fallback(handle_discovery_wrong_method))
            .route(HEALTH_PATH, get(handle_health).fallback(handle_discovery_wrong_method))
            .route("/", get(handle_root).fallback(handle_discovery_wrong_method))
            .fallback(handle_not_found)
            .with_state(state);
        if self.config.server.cors.is_enabled() {
            return Ok(app.layer(cors_layer(&self.config.server.cors)?));
        }
        Ok(app)
    }

    /// Serves requests until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let addr: SocketAddr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| McpServerError::Config(err.to_string()))?;
        let app = self.router()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| McpServerError::Transport(format!("http bind failed: {err}")))?;
        self.log_banner(addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| McpServerError::Transport(format!("http server failed: {err}")))
    }

    /// Logs the startup banner.
    fn log_banner(&self, addr: SocketAddr) {
        let base = format!("http://{addr}");
        tracing::info!(
            bind = %addr,
            rpc = %format!("{base}{}", self.config.server.rpc_path),
            health = %format!("{base}{HEALTH_PATH}"),
            tools_url = %format!("{base}{TOOLS_PATH}"),
            tools = self.registry.len(),
            "starting {SERVER_NAME} {SERVER_VERSION}"
        );
        if self.auth.is_enabled() {
            tracing::info!("authentication enabled: bearer token required");
        } else {
            tracing::warn!("authentication disabled (development mode)");
        }
    }
}

/// Selects the audit sink from configuration.
fn build_audit_sink(config: &DevinfoConfig) -> Result<Arc<dyn McpAuditSink>, McpServerError> {
    let audit = &config.server.audit;
    if !audit.enabled {
        return Ok(Arc::new(McpNoopAuditSink));
    }
    match &audit.path {
        Some(path) => {
            let sink = McpFileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| McpServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(McpStderrAuditSink)),
    }
}

/// Builds the CORS layer from configured origins.
fn cors_layer(cors: &ServerCorsConfig) -> Result<CorsLayer, McpServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    if cors.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = cors
        .allow_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|_| McpServerError::Config(format!("invalid cors origin: {origin}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Resolves when Ctrl-C is received.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; serving until the process is stopped");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// ============================================================================
// SECTION: HTTP Handlers
// ============================================================================

/// Shared server state for HTTP handlers.
struct ServerState {
    /// Request dispatcher.
    dispatcher: Dispatcher,
    /// Audit sink.
    audit: Arc<dyn McpAuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// RPC endpoint path, for audit events.
    rpc_path: String,
}

impl ServerState {
    /// Emits the audit event for a dispatch.
    fn audit_dispatch(&self, path: &str, dispatch: &Dispatch) {
        let error = dispatch.response.error();
        self.audit.record(&McpAuditEvent::new(McpAuditEventParams {
            request_id: dispatch.request_id(),
            path: path.to_string(),
            method: dispatch.method,
            tool: dispatch.tool.clone(),
            outcome: dispatch.outcome(),
            error_code: error.map(|error| error.code),
            error_kind: dispatch.error_kind.map(|kind| kind.label()),
            http_status: dispatch.status.as_u16(),
            auth_method: dispatch.auth.as_ref().map(|auth| auth.method),
            token_fingerprint: dispatch.auth.as_ref().and_then(|auth| auth.token_fingerprint.clone()),
            request_bytes: dispatch.request_bytes,
            response_bytes: dispatch.response_bytes,
            latency: dispatch.latency,
        }));
    }
}

/// Handles JSON-RPC requests on the RPC endpoint.
async fn handle_rpc(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Body,
) -> impl IntoResponse {
    let dispatch = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => state.dispatcher.handle(&bytes, authorization(&headers)).await,
        Err(_) => state.dispatcher.reject(
            &DispatchError::UnreadableBody(format!(
                "body exceeds {} bytes or could not be read",
                state.max_body_bytes
            )),
            content_length(&headers),
        ),
    };
    state.audit_dispatch(&state.rpc_path, &dispatch);
    (dispatch.status, Json(dispatch.response))
}

/// Rejects non-POST methods on the RPC endpoint.
async fn handle_rpc_wrong_method(
    State(state): State<Arc<ServerState>>,
    method: Method,
) -> impl IntoResponse {
    let dispatch = state.dispatcher.reject(
        &DispatchError::InvalidEnvelope(format!("{method} is not supported; use POST")),
        0,
    );
    state.audit_dispatch(&state.rpc_path, &dispatch);
    (dispatch.status, Json(dispatch.response))
}

/// Lists tools for discovery, behind the shared auth guard.
async fn handle_tools(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let auth = state.dispatcher.auth().authenticate(authorization(&headers));
    let (status, body, error_kind, authorized) = match auth {
        Ok(authorized) => {
            let tools: Vec<Value> = state
                .dispatcher
                .registry()
                .list()
                .into_iter()
                .map(|descriptor| {
                    json!({
                        "name": descriptor.name,
                        "description": descriptor.description,
                        "input_schema": descriptor.input_schema_json(),
                    })
                })
                .collect();
            (StatusCode::OK, json!({ "tools": tools }), None, Some(authorized))
        }
        Err(err) => {
            let error = DispatchError::Unauthorized(err);
            let (status, response) = error_envelope(Value::Null, &error);
            let body = serde_json::to_value(&response).unwrap_or(Value::Null);
            (status, body, Some(error.kind()), None)
        }
    };
    let response_bytes = serde_json::to_vec(&body).map(|bytes| bytes.len()).unwrap_or_default();
    state.audit.record(&McpAuditEvent::new(McpAuditEventParams {
        request_id: None,
        path: TOOLS_PATH.to_string(),
        method: McpMethod::ToolsList,
        tool: None,
        outcome: if error_kind.is_some() { McpOutcome::Error } else { McpOutcome::Ok },
        error_code: error_kind.map(|kind| kind.code()),
        error_kind: error_kind.map(|kind| kind.label()),
        http_status: status.as_u16(),
        auth_method: authorized.as_ref().map(|auth| auth.method),
        token_fingerprint: authorized.and_then(|auth| auth.token_fingerprint),
        request_bytes: 0,
        response_bytes,
        latency: started.elapsed(),
    }));
    (status, Json(body)).into_response()
}

/// Reports liveness.
async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "server": SERVER_NAME,
        "version": SERVER_VERSION,
    }))
}

/// Reports server information and endpoints.
async fn handle_root(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "name": SERVER_NAME,
        "description": "HTTP-based MCP server exposing developer information tools",
        "version": SERVER_VERSION,
        "endpoints": {
            "mcp": format!("{} - MCP protocol endpoint", state.rpc_path),
            "health": format!("{HEALTH_PATH} - Health check"),
            "tools": format!("{TOOLS_PATH} - List available tools"),
        },
    }))
}

/// Rejects non-GET methods on discovery routes.
async fn handle_discovery_wrong_method(method: Method, uri: Uri) -> impl IntoResponse {
    let error = DispatchError::InvalidEnvelope(format!(
        "{method} is not supported on {}; use GET",
        uri.path()
    ));
    let (status, response) = error_envelope(Value::Null, &error);
    (status, Json(response))
}

/// Answers unknown routes with a JSON envelope.
async fn handle_not_found(uri: Uri) -> impl IntoResponse {
    let error = DispatchError::RouteNotFound {
        path: uri.path().to_string(),
    };
    let (status, response) = error_envelope(Value::Null, &error);
    (status, Json(response))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the `Authorization` header value.
///
/// A header that is present but not visible ASCII is passed through as an
/// empty value so it fails as malformed rather than missing.
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).map(|value| value.to_str().unwrap_or_default())
}

/// Returns the declared `Content-Length`, or zero.
fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
