// crates/devinfo-mcp/src/lib.rs
// ============================================================================
// Module: devinfo MCP
// Description: JSON-RPC tool dispatcher and HTTP transport for devinfo.
// Purpose: Expose registered developer-information tools over MCP.
// Dependencies: devinfo-config, axum, tokio, serde_json
// ============================================================================

//! ## Overview
//! devinfo MCP accepts JSON-RPC 2.0 envelopes over HTTP, authenticates them
//! with a shared bearer secret, validates tool arguments against declared
//! field specs, and routes calls through a single [`Dispatcher`]. The
//! [`ToolRegistry`] is the only extension point: new tools register a
//! descriptor and a handler and never add routing branches.
//!
//! Security posture: request bodies and headers are untrusted; every failure
//! is converted to a JSON-RPC error envelope at the dispatcher boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod dispatcher;
pub mod handler;
pub mod registry;
pub mod response;
pub mod server;
pub mod telemetry;
pub mod tools;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use audit::SecurityAuditEvent;
pub use auth::AuthError;
pub use auth::AuthGuard;
pub use auth::AuthMethod;
pub use auth::Authorized;
pub use dispatcher::Dispatch;
pub use dispatcher::Dispatcher;
pub use handler::ToolFailure;
pub use handler::ToolHandler;
pub use handler::sync_handler;
pub use registry::FieldKind;
pub use registry::FieldSpec;
pub use registry::RegistryError;
pub use registry::ToolDescriptor;
pub use registry::ToolRegistry;
pub use response::DispatchError;
pub use response::JsonRpcError;
pub use response::JsonRpcResponse;
pub use response::RpcErrorKind;
pub use server::McpServer;
pub use server::McpServerError;
pub use telemetry::MCP_LATENCY_BUCKETS_MS;
pub use telemetry::McpMethod;
pub use telemetry::McpMetricEvent;
pub use telemetry::McpMetrics;
pub use telemetry::McpOutcome;
pub use telemetry::NoopMetrics;
pub use telemetry::latency_bucket_ms;
pub use tools::builtin_registry;
pub use validation::ValidatedArguments;
pub use validation::ValidationError;
pub use validation::ValidationReason;
