// crates/devinfo-mcp/src/registry/tests.rs
// ============================================================================
// Module: Tool Registry Unit Tests
// Description: Unit tests for registration, lookup, and schema rendering.
// Purpose: Validate uniqueness, ordering, and descriptor serialization.
// Dependencies: devinfo-mcp
// ============================================================================

//! ## Overview
//! Exercises registry invariants: unique kebab-case names, stable listing
//! order, and the JSON Schema shape published for `inputSchema`.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;

use super::FieldKind;
use super::FieldSpec;
use super::RegistryError;
use super::ToolDescriptor;
use super::ToolRegistry;
use super::is_kebab_case;
use super::json_type_name;
use crate::handler::ToolHandler;
use crate::handler::sync_handler;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Handler echoing its `text` argument.
fn echo_handler() -> Arc<dyn ToolHandler> {
    sync_handler(|arguments| Ok(arguments.str("text").unwrap_or_default().to_string()))
}

/// Descriptor with a single required `text` field.
fn descriptor(name: &str) -> ToolDescriptor {
    ToolDescriptor::new(name, "test tool", vec![FieldSpec::required("text", FieldKind::String)])
}

// ============================================================================
// SECTION: Registration Tests
// ============================================================================

#[test]
fn register_rejects_duplicate_name() {
    let mut registry = ToolRegistry::new();
    registry.register(descriptor("echo"), echo_handler()).expect("first registration");
    let err = registry.register(descriptor("echo"), echo_handler()).expect_err("duplicate");
    assert_eq!(err, RegistryError::DuplicateTool("echo".to_string()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn register_rejects_non_kebab_names() {
    let mut registry = ToolRegistry::new();
    for name in ["", "Echo", "echo_tool", "-echo", "echo-", "echo--tool", "echo tool"] {
        let err = registry.register(descriptor(name), echo_handler()).expect_err(name);
        assert!(matches!(err, RegistryError::InvalidName(_)), "{name} should be rejected");
    }
    assert!(registry.is_empty());
}

#[test]
fn kebab_case_accepts_digits_and_segments() {
    assert!(is_kebab_case("get-project-info"));
    assert!(is_kebab_case("tool2"));
    assert!(is_kebab_case("a-1-b"));
}

#[test]
fn register_rejects_duplicate_field_names() {
    let mut registry = ToolRegistry::new();
    let descriptor = ToolDescriptor::new(
        "dup-fields",
        "test tool",
        vec![
            FieldSpec::required("text", FieldKind::String),
            FieldSpec::optional("text", FieldKind::Integer),
        ],
    );
    let err = registry.register(descriptor, echo_handler()).expect_err("duplicate field");
    assert!(matches!(err, RegistryError::InvalidSchema { .. }));
}

#[test]
fn register_rejects_default_of_wrong_kind() {
    let mut registry = ToolRegistry::new();
    let descriptor = ToolDescriptor::new(
        "bad-default",
        "test tool",
        vec![FieldSpec::optional("count", FieldKind::Integer).with_default("three")],
    );
    let err = registry.register(descriptor, echo_handler()).expect_err("bad default");
    assert!(err.to_string().contains("default for count is not integer"));
}

// ============================================================================
// SECTION: Lookup Tests
// ============================================================================

#[test]
fn lookup_returns_registered_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(descriptor("echo"), echo_handler()).expect("register");
    let tool = registry.lookup("echo").expect("lookup");
    assert_eq!(tool.descriptor().name, "echo");
}

#[test]
fn lookup_miss_is_not_found() {
    let registry = ToolRegistry::new();
    let err = registry.lookup("missing").err().expect("miss");
    assert_eq!(err, RegistryError::NotFound("missing".to_string()));
}

#[test]
fn list_preserves_registration_order() {
    let mut registry = ToolRegistry::new();
    for name in ["zeta", "alpha", "mid-tool"] {
        registry.register(descriptor(name), echo_handler()).expect("register");
    }
    let names: Vec<&str> = registry.list().iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid-tool"]);
}

// ============================================================================
// SECTION: Schema Tests
// ============================================================================

#[test]
fn descriptor_serializes_input_schema_object() {
    let descriptor = ToolDescriptor::new(
        "schema-tool",
        "renders a schema",
        vec![
            FieldSpec::required("name", FieldKind::String).with_description("who"),
            FieldSpec::optional("loud", FieldKind::Boolean).with_default(false),
        ],
    );
    let value = serde_json::to_value(&descriptor).expect("serialize");
    assert_eq!(
        value,
        json!({
            "name": "schema-tool",
            "description": "renders a schema",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "who" },
                    "loud": { "type": "boolean", "default": false }
                },
                "required": ["name"]
            }
        })
    );
}

#[test]
fn field_kind_matches_runtime_types() {
    assert!(FieldKind::String.matches(&json!("x")));
    assert!(FieldKind::Integer.matches(&json!(3)));
    assert!(FieldKind::Integer.matches(&json!(-3)));
    assert!(!FieldKind::Integer.matches(&json!(3.5)));
    assert!(FieldKind::Boolean.matches(&json!(true)));
    assert!(!FieldKind::Boolean.matches(&json!("true")));
}

#[test]
fn json_type_names_distinguish_integers() {
    assert_eq!(json_type_name(&json!(1)), "integer");
    assert_eq!(json_type_name(&json!(1.5)), "number");
    assert_eq!(json_type_name(&json!(null)), "null");
    assert_eq!(json_type_name(&json!([])), "array");
    assert_eq!(json_type_name(&json!({})), "object");
}
