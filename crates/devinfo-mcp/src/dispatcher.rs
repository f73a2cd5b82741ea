// crates/devinfo-mcp/src/dispatcher.rs
// ============================================================================
// Module: MCP Dispatcher
// Description: Single entry point from raw request bytes to a response.
// Purpose: Orchestrate parse, auth, registry lookup, validation, and invoke.
// Dependencies: axum, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! [`Dispatcher::handle`] runs one request through a fixed pipeline:
//! parse the envelope, authenticate, route by method, validate arguments,
//! invoke the handler, and map the outcome to an envelope. The dispatcher
//! holds no cross-request mutable state, so concurrent calls need no
//! coordination. Handlers run on their own task under an optional timeout;
//! failures, panics, and timeouts all surface as `ToolExecutionError`.
//!
//! Security posture: the body is untrusted and every failure is converted to
//! an envelope here; nothing escapes to the transport as a raw fault.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::http::StatusCode;
use serde_json::Map;
use serde_json::Value;

use crate::auth::AuthGuard;
use crate::auth::Authorized;
use crate::handler::ToolHandler;
use crate::registry::ToolRegistry;
use crate::response::DispatchError;
use crate::response::JSONRPC_VERSION;
use crate::response::JsonRpcResponse;
use crate::response::RpcErrorKind;
use crate::response::ToolCallResult;
use crate::response::ToolListResult;
use crate::response::error_envelope;
use crate::response::to_envelope;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetricEvent;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::telemetry::NoopMetrics;
use crate::validation::ValidatedArguments;
use crate::validation::validate;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Parsed JSON-RPC request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    /// Request identifier (string, number, or null).
    pub id: Value,
    /// Method name; `None` when absent or null.
    pub method: Option<String>,
    /// Parameters; `None` when absent or null.
    pub params: Option<Value>,
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// HTTP status paired with the envelope.
    pub status: StatusCode,
    /// Response envelope.
    pub response: JsonRpcResponse,
    /// Method classification.
    pub method: McpMethod,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Error kind when the request failed.
    pub error_kind: Option<RpcErrorKind>,
    /// Authentication result when the request was admitted.
    pub auth: Option<Authorized>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Serialized response size in bytes.
    pub response_bytes: usize,
    /// Time spent in the dispatcher.
    pub latency: Duration,
}

impl Dispatch {
    /// Returns the outcome classification.
    #[must_use]
    pub const fn outcome(&self) -> McpOutcome {
        if self.error_kind.is_some() { McpOutcome::Error } else { McpOutcome::Ok }
    }

    /// Returns the request identifier as a string, when one was provided.
    #[must_use]
    pub fn request_id(&self) -> Option<String> {
        match &self.response.id {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Builds the metric event for this dispatch.
    #[must_use]
    pub fn metric_event(&self) -> McpMetricEvent {
        McpMetricEvent {
            method: self.method,
            tool: self.tool.clone(),
            outcome: self.outcome(),
            error_code: self.error_kind.map(RpcErrorKind::code),
            error_kind: self.error_kind.map(RpcErrorKind::label),
            request_bytes: self.request_bytes,
            response_bytes: self.response_bytes,
        }
    }
}

/// Per-call facts gathered while dispatching.
#[derive(Default)]
struct DispatchTrace {
    /// Echoed request identifier.
    id: Option<Value>,
    /// Method classification.
    method: Option<McpMethod>,
    /// Tool name for `tools/call`.
    tool: Option<String>,
    /// Authentication result.
    auth: Option<Authorized>,
}

/// JSON-RPC tool dispatcher.
///
/// # Invariants
/// - The registry is shared read-only; no state is mutated across calls.
pub struct Dispatcher {
    /// Registered tools.
    registry: Arc<ToolRegistry>,
    /// Shared-secret guard.
    auth: AuthGuard,
    /// Per-call handler timeout; `None` runs handlers to completion.
    call_timeout: Option<Duration>,
    /// Metrics sink.
    metrics: Arc<dyn McpMetrics>,
}

impl Dispatcher {
    /// Builds a dispatcher over a registry and auth guard.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, auth: AuthGuard) -> Self {
        Self {
            registry,
            auth,
            call_timeout: None,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Sets the per-call handler timeout.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the auth guard.
    #[must_use]
    pub const fn auth(&self) -> &AuthGuard {
        &self.auth
    }

    /// Handles one raw request body with an optional `Authorization` value.
    pub async fn handle(&self, body: &[u8], credential: Option<&str>) -> Dispatch {
        let started = Instant::now();
        let mut trace = DispatchTrace::default();
        let outcome = self.run(body, credential, &mut trace).await;
        let id = trace.id.take().unwrap_or(Value::Null);
        let error_kind = outcome.as_ref().err().map(DispatchError::kind);
        let (status, response) = to_envelope(id, outcome);
        self.finish(
            Dispatch {
                status,
                response,
                method: trace.method.unwrap_or(McpMethod::Invalid),
                tool: trace.tool,
                error_kind,
                auth: trace.auth,
                request_bytes: body.len(),
                response_bytes: 0,
                latency: Duration::ZERO,
            },
            started,
        )
    }

    /// Converts a transport-level failure into a dispatch with `id = null`.
    #[must_use]
    pub fn reject(&self, error: &DispatchError, request_bytes: usize) -> Dispatch {
        let started = Instant::now();
        let (status, response) = error_envelope(Value::Null, error);
        self.finish(
            Dispatch {
                status,
                response,
                method: McpMethod::Invalid,
                tool: None,
                error_kind: Some(error.kind()),
                auth: None,
                request_bytes,
                response_bytes: 0,
                latency: Duration::ZERO,
            },
            started,
        )
    }

    /// Fills size and latency, then records metrics.
    fn finish(&self, mut dispatch: Dispatch, started: Instant) -> Dispatch {
        dispatch.response_bytes =
            serde_json::to_vec(&dispatch.response).map(|bytes| bytes.len()).unwrap_or_default();
        dispatch.latency = started.elapsed();
        let event = dispatch.metric_event();
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, dispatch.latency);
        dispatch
    }

    /// Runs the pipeline, recording facts into `trace`.
    async fn run(
        &self,
        body: &[u8],
        credential: Option<&str>,
        trace: &mut DispatchTrace,
    ) -> Result<Value, DispatchError> {
        let request = parse_request(body, trace)?;
        let classified = request.method.as_deref().map_or(McpMethod::Other, McpMethod::from_method);
        trace.method = Some(classified);
        let authorized = self.auth.authenticate(credential).map_err(DispatchError::Unauthorized)?;
        trace.auth = Some(authorized);
        match classified {
            McpMethod::ToolsList => self.list_tools(),
            McpMethod::ToolsCall => self.call_tool(request.params, trace).await,
            McpMethod::Invalid | McpMethod::Other => Err(DispatchError::MethodNotFound {
                method: request.method,
            }),
        }
    }

    /// Builds the `tools/list` result.
    fn list_tools(&self) -> Result<Value, DispatchError> {
        serde_json::to_value(ToolListResult {
            tools: self.registry.list(),
        })
        .map_err(|_| DispatchError::Serialization)
    }

    /// Resolves, validates, and invokes a `tools/call`.
    async fn call_tool(
        &self,
        params: Option<Value>,
        trace: &mut DispatchTrace,
    ) -> Result<Value, DispatchError> {
        let params = match params {
            None => Map::new(),
            Some(Value::Object(params)) => params,
            Some(_) => {
                return Err(DispatchError::InvalidParams("params must be an object".to_string()));
            }
        };
        let name = match params.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(DispatchError::MissingToolName);
            }
            Some(_) => {
                return Err(DispatchError::InvalidParams(
                    "params.name must be a string".to_string(),
                ));
            }
        };
        trace.tool = Some(name.clone());
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments.clone(),
            Some(_) => {
                return Err(DispatchError::InvalidParams(
                    "params.arguments must be an object".to_string(),
                ));
            }
        };
        let tool =
            self.registry.lookup(&name).map_err(|_| DispatchError::UnknownTool(name.clone()))?;
        let validated = validate(&tool.descriptor().input_schema, &arguments)
            .map_err(DispatchError::Validation)?;
        let text = self.invoke(&name, tool.handler(), validated).await?;
        serde_json::to_value(ToolCallResult::text(text)).map_err(|_| DispatchError::Serialization)
    }

    /// Runs a handler on its own task under the configured timeout.
    async fn invoke(
        &self,
        tool: &str,
        handler: Arc<dyn ToolHandler>,
        arguments: ValidatedArguments,
    ) -> Result<String, DispatchError> {
        let mut task = tokio::spawn(async move { handler.call(arguments).await });
        let joined = match self.call_timeout {
            Some(limit) => {
                if let Ok(joined) = tokio::time::timeout(limit, &mut task).await {
                    joined
                } else {
                    task.abort();
                    let reason = format!("timed out after {} ms", limit.as_millis());
                    tracing::warn!(tool, %reason, "tool call timed out");
                    return Err(DispatchError::ToolExecution {
                        tool: tool.to_string(),
                        reason,
                    });
                }
            }
            None => task.await,
        };
        let reason = match joined {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(failure)) => failure.to_string(),
            Err(join_error) if join_error.is_panic() => "tool handler panicked".to_string(),
            Err(_) => "tool handler was cancelled".to_string(),
        };
        tracing::warn!(tool, %reason, "tool call failed");
        Err(DispatchError::ToolExecution {
            tool: tool.to_string(),
            reason,
        })
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Decodes the body into an envelope, recording the id as soon as it is known.
fn parse_request(body: &[u8], trace: &mut DispatchTrace) -> Result<RpcRequest, DispatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DispatchError::EmptyBody);
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|err| DispatchError::Parse(err.to_string()))?;
    let Value::Object(mut envelope) = value else {
        return Err(DispatchError::InvalidEnvelope("request must be a json object".to_string()));
    };
    let id = match envelope.remove("id") {
        None => Value::Null,
        Some(id @ (Value::Null | Value::String(_) | Value::Number(_))) => id,
        Some(_) => {
            return Err(DispatchError::InvalidEnvelope(
                "id must be a string, number, or null".to_string(),
            ));
        }
    };
    trace.id = Some(id.clone());
    match envelope.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        _ => {
            return Err(DispatchError::InvalidEnvelope(format!(
                "jsonrpc must be \"{JSONRPC_VERSION}\""
            )));
        }
    }
    let method = match envelope.remove("method") {
        None | Some(Value::Null) => None,
        Some(Value::String(method)) => Some(method),
        Some(_) => {
            return Err(DispatchError::InvalidEnvelope("method must be a string".to_string()));
        }
    };
    let params = match envelope.remove("params") {
        None | Some(Value::Null) => None,
        Some(params) => Some(params),
    };
    Ok(RpcRequest {
        id,
        method,
        params,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
