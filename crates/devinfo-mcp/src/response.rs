// crates/devinfo-mcp/src/response.rs
// ============================================================================
// Module: Response Builder
// Description: JSON-RPC envelopes and the error taxonomy mapping.
// Purpose: Map every dispatch outcome to exactly one (code, HTTP status).
// Dependencies: axum, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Successes always map to HTTP 200. Each [`DispatchError`] variant maps to
//! one [`RpcErrorKind`], and each kind maps to one JSON-RPC code and one HTTP
//! status:
//!
//! | Kind | Code | HTTP |
//! |---|---|---|
//! | `ParseError` | -32700 | 400 |
//! | `InvalidRequest` | -32600 | 400 |
//! | `MethodNotFound` | -32601 | 400 |
//! | `InvalidParams` | -32602 | 400 |
//! | `Unauthorized` | -32001 | 401 |
//! | `ToolExecutionError` | -32603 | 500 |
//!
//! These pairs are wire-visible; existing clients depend on them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::registry::ToolDescriptor;
use crate::validation::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC protocol version emitted and accepted.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Reserved JSON-RPC failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// Body is not valid JSON.
    ParseError,
    /// Empty body or malformed envelope.
    InvalidRequest,
    /// Unknown method.
    MethodNotFound,
    /// Missing tool name, unknown tool, or argument validation failure.
    InvalidParams,
    /// Missing or invalid credential.
    Unauthorized,
    /// Handler failed, panicked, or timed out.
    ToolExecutionError,
}

impl RpcErrorKind {
    /// Every kind, in taxonomy order.
    pub const ALL: [Self; 6] = [
        Self::ParseError,
        Self::InvalidRequest,
        Self::MethodNotFound,
        Self::InvalidParams,
        Self::Unauthorized,
        Self::ToolExecutionError,
    ];

    /// Returns the JSON-RPC error code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::Unauthorized => -32001,
            Self::ToolExecutionError => -32603,
        }
    }

    /// Returns the HTTP status paired with the code.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::ParseError
            | Self::InvalidRequest
            | Self::MethodNotFound
            | Self::InvalidParams => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::ToolExecutionError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable label for audit and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ParseError => "parse_error",
            Self::InvalidRequest => "invalid_request",
            Self::MethodNotFound => "method_not_found",
            Self::InvalidParams => "invalid_params",
            Self::Unauthorized => "unauthorized",
            Self::ToolExecutionError => "tool_execution_error",
        }
    }

    /// Returns the kind for a reserved code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32001 => Some(Self::Unauthorized),
            -32603 => Some(Self::ToolExecutionError),
            _ => None,
        }
    }
}

/// Failures recovered at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Request body is empty.
    #[error("request body is required")]
    EmptyBody,
    /// Request body could not be read by the transport.
    #[error("request body unreadable: {0}")]
    UnreadableBody(String),
    /// Request body is not valid JSON.
    #[error("invalid json: {0}")]
    Parse(String),
    /// JSON is valid but is not a usable envelope.
    #[error("invalid request: {0}")]
    InvalidEnvelope(String),
    /// Credential missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(AuthError),
    /// Method is absent or unsupported.
    #[error("method not found: {}", method.as_deref().unwrap_or("null"))]
    MethodNotFound {
        /// Requested method, `None` when absent.
        method: Option<String>,
    },
    /// `tools/call` without a tool name.
    #[error("tool name is required")]
    MissingToolName,
    /// `tools/call` params have the wrong shape.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// No tool registered under the requested name.
    #[error("tool not found: {0}")]
    UnknownTool(String),
    /// Arguments failed validation.
    #[error("{0}")]
    Validation(ValidationError),
    /// Handler failed, panicked, or timed out.
    #[error("tool {tool} failed: {reason}")]
    ToolExecution {
        /// Tool name.
        tool: String,
        /// Failure description.
        reason: String,
    },
    /// Result could not be serialized.
    #[error("response serialization failed")]
    Serialization,
    /// HTTP path is not served.
    #[error("no route for {path}")]
    RouteNotFound {
        /// Requested path.
        path: String,
    },
}

impl DispatchError {
    /// Returns the taxonomy kind for this failure.
    #[must_use]
    pub const fn kind(&self) -> RpcErrorKind {
        match self {
            Self::Parse(_) => RpcErrorKind::ParseError,
            Self::EmptyBody | Self::UnreadableBody(_) | Self::InvalidEnvelope(_) => {
                RpcErrorKind::InvalidRequest
            }
            Self::MethodNotFound {
                ..
            }
            | Self::RouteNotFound {
                ..
            } => RpcErrorKind::MethodNotFound,
            Self::MissingToolName
            | Self::InvalidParams(_)
            | Self::UnknownTool(_)
            | Self::Validation(_) => RpcErrorKind::InvalidParams,
            Self::Unauthorized(_) => RpcErrorKind::Unauthorized,
            Self::ToolExecution {
                ..
            }
            | Self::Serialization => RpcErrorKind::ToolExecutionError,
        }
    }

    /// Returns the `error.data` payload, when the failure carries detail.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::MethodNotFound {
                method,
            } => Some(json!({ "method": method })),
            Self::MissingToolName => Some(json!({ "field": "name", "reason": "missing" })),
            Self::UnknownTool(tool) => Some(json!({ "tool": tool })),
            Self::Validation(error) => Some(error.to_data()),
            Self::ToolExecution {
                tool,
                reason,
            } => Some(json!({ "tool": tool, "reason": reason })),
            Self::RouteNotFound {
                path,
            } => Some(json!({ "path": path })),
            Self::EmptyBody
            | Self::UnreadableBody(_)
            | Self::Parse(_)
            | Self::InvalidEnvelope(_)
            | Self::Unauthorized(_)
            | Self::InvalidParams(_)
            | Self::Serialization => None,
        }
    }
}

// ============================================================================
// SECTION: Envelopes
// ============================================================================

/// JSON-RPC error payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    /// Reserved error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Successful result.
    Result(Value),
    /// Failure detail.
    Error(JsonRpcError),
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    pub jsonrpc: &'static str,
    /// Echoed request identifier, or `null`.
    pub id: Value,
    /// Result or error.
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl JsonRpcResponse {
    /// Builds a success envelope.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    /// Builds an error envelope for a dispatch failure.
    #[must_use]
    pub fn failure(id: Value, error: &DispatchError) -> Self {
        let kind = error.kind();
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Error(JsonRpcError {
                code: kind.code(),
                message: error.to_string(),
                data: error.data(),
            }),
        }
    }

    /// Returns the result payload on success.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(result) => Some(result),
            ResponsePayload::Error(_) => None,
        }
    }

    /// Returns the error payload on failure.
    #[must_use]
    pub const fn error(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Result(_) => None,
            ResponsePayload::Error(error) => Some(error),
        }
    }
}

/// Result payload for `tools/list`.
#[derive(Debug, Serialize)]
pub struct ToolListResult<'a> {
    /// Registered descriptors in registration order.
    pub tools: Vec<&'a ToolDescriptor>,
}

/// Result payload for `tools/call`.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    /// Tool output content.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Wraps handler text as a single text content item.
    #[must_use]
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text,
            }],
        }
    }
}

/// Tool output payloads.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text output.
    Text {
        /// Handler output.
        text: String,
    },
}

// ============================================================================
// SECTION: Error Mapper
// ============================================================================

/// Maps a dispatch outcome to an HTTP status and envelope.
#[must_use]
pub fn to_envelope(
    id: Value,
    outcome: Result<Value, DispatchError>,
) -> (StatusCode, JsonRpcResponse) {
    match outcome {
        Ok(result) => success_envelope(id, result),
        Err(error) => error_envelope(id, &error),
    }
}

/// Builds a 200 success envelope.
#[must_use]
pub const fn success_envelope(id: Value, result: Value) -> (StatusCode, JsonRpcResponse) {
    (StatusCode::OK, JsonRpcResponse::success(id, result))
}

/// Builds an error envelope with the status paired to its kind.
#[must_use]
pub fn error_envelope(id: Value, error: &DispatchError) -> (StatusCode, JsonRpcResponse) {
    (error.kind().status(), JsonRpcResponse::failure(id, error))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
