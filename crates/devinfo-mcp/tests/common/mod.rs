// crates/devinfo-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for devinfo-mcp integration tests.
// Purpose: Build registries, dispatchers, and request bodies deterministically.
// Dependencies: devinfo-config, devinfo-mcp
// ============================================================================

//! ## Overview
//! Provides a small registry of test tools next to the built-in tools,
//! dispatcher constructors for keyed and dev-mode guards, and JSON-RPC body
//! builders.
//!
//! Security posture: keyed fixtures use a fixed secret so auth failures are
//! exercised against a real guard, never a disabled one.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use devinfo_config::DevinfoConfig;
use devinfo_mcp::AuthGuard;
use devinfo_mcp::Dispatcher;
use devinfo_mcp::FieldKind;
use devinfo_mcp::FieldSpec;
use devinfo_mcp::McpAuditEvent;
use devinfo_mcp::McpAuditSink;
use devinfo_mcp::ToolDescriptor;
use devinfo_mcp::ToolFailure;
use devinfo_mcp::ToolRegistry;
use devinfo_mcp::builtin_registry;
use devinfo_mcp::sync_handler;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Shared secret used by keyed fixtures.
pub const SECRET: &str = "secret1";

// ============================================================================
// SECTION: Registries
// ============================================================================

/// Returns a registry with deterministic test tools.
pub fn test_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(
            ToolDescriptor::new(
                "echo",
                "Echoes text, optionally repeated",
                vec![
                    FieldSpec::required("text", FieldKind::String),
                    FieldSpec::optional("times", FieldKind::Integer).with_default(1),
                ],
            ),
            sync_handler(|arguments| {
                let text = arguments.require_str("text")?;
                let times = arguments.integer("times").unwrap_or(1).max(0);
                Ok(text.repeat(usize::try_from(times).unwrap_or_default()))
            }),
        )
        .unwrap();
    registry
        .register(
            ToolDescriptor::new("broken", "Always fails", Vec::new()),
            sync_handler(|_| Err(ToolFailure::new("upstream refused connection"))),
        )
        .unwrap();
    registry
}

/// Returns the built-in registry.
pub fn builtin() -> ToolRegistry {
    builtin_registry().expect("builtin registry")
}

// ============================================================================
// SECTION: Dispatchers
// ============================================================================

/// Dispatcher over the built-in tools with authentication disabled.
pub fn dev_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(builtin()), AuthGuard::disabled())
}

/// Dispatcher over the built-in tools requiring [`SECRET`].
pub fn keyed_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(builtin()), AuthGuard::new(Some(SECRET.to_string())))
}

/// Dispatcher over [`test_registry`] with authentication disabled.
pub fn test_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(test_registry()), AuthGuard::disabled())
}

/// Returns the bearer header value for [`SECRET`].
pub fn bearer() -> String {
    format!("Bearer {SECRET}")
}

// ============================================================================
// SECTION: Configs
// ============================================================================

/// Dev-mode config with stderr auditing disabled.
pub fn dev_config() -> DevinfoConfig {
    DevinfoConfig::from_toml("[server.audit]\nenabled = false\n\n[dev]\nallow_unauthenticated = true\n")
        .unwrap()
}

/// Keyed config with stderr auditing disabled.
pub fn keyed_config() -> DevinfoConfig {
    DevinfoConfig::from_toml(&format!(
        "[server.audit]\nenabled = false\n\n[server.auth]\napi_key = \"{SECRET}\"\n"
    ))
    .unwrap()
}

// ============================================================================
// SECTION: Bodies
// ============================================================================

/// Serializes a JSON-RPC request.
pub fn request(id: &Value, method: &str, params: Option<Value>) -> Vec<u8> {
    let mut envelope = json!({ "jsonrpc": "2.0", "id": id, "method": method });
    if let Some(params) = params {
        envelope["params"] = params;
    }
    serde_json::to_vec(&envelope).unwrap()
}

/// Serializes a `tools/call` request.
pub fn call(id: &Value, name: &str, arguments: &Value) -> Vec<u8> {
    request(id, "tools/call", Some(json!({ "name": name, "arguments": arguments })))
}

/// Serializes a `tools/list` request.
pub fn list(id: &Value) -> Vec<u8> {
    request(id, "tools/list", None)
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps request events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    pub events: Mutex<Vec<McpAuditEvent>>,
}

impl McpAuditSink for RecordingAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
