// crates/devinfo-mcp/src/validation/tests.rs
// ============================================================================
// Module: Input Validation Unit Tests
// Description: Unit tests for required and typed field checks.
// Purpose: Validate ordering, defaults, and error payloads.
// Dependencies: devinfo-mcp
// ============================================================================

//! ## Overview
//! Covers missing fields, type mismatches, defaults, null handling, extra
//! fields, and declaration-order short-circuiting.

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

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::ValidationReason;
use super::validate;
use crate::registry::FieldKind;
use crate::registry::FieldSpec;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Schema mixing required, defaulted, and optional fields.
fn schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("name", FieldKind::String),
        FieldSpec::required("count", FieldKind::Integer),
        FieldSpec::optional("verbose", FieldKind::Boolean).with_default(false),
        FieldSpec::optional("note", FieldKind::String),
    ]
}

/// Unwraps a JSON object literal into an argument map.
fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture must be an object"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn valid_arguments_apply_defaults_and_drop_extras() {
    let validated =
        validate(&schema(), &args(json!({"name": "a", "count": 2, "extra": true}))).expect("valid");
    assert_eq!(validated.str("name"), Some("a"));
    assert_eq!(validated.integer("count"), Some(2));
    assert_eq!(validated.boolean("verbose"), Some(false));
    assert!(validated.get("note").is_none());
    assert!(validated.get("extra").is_none());
    assert_eq!(validated.len(), 3);
}

#[test]
fn missing_required_field_is_reported() {
    let err = validate(&schema(), &args(json!({"name": "a"}))).expect_err("missing count");
    assert_eq!(err.field, "count");
    assert_eq!(err.reason, ValidationReason::Missing);
    assert_eq!(err.to_data(), json!({"field": "count", "reason": "missing"}));
}

#[test]
fn type_mismatch_reports_expected_and_actual() {
    let err =
        validate(&schema(), &args(json!({"name": "a", "count": "2"}))).expect_err("bad count");
    assert_eq!(
        err.to_data(),
        json!({"field": "count", "reason": "type mismatch", "expected": "integer", "actual": "string"})
    );
}

#[test]
fn fractional_number_is_not_an_integer() {
    let err = validate(&schema(), &args(json!({"name": "a", "count": 2.5}))).expect_err("float");
    assert_eq!(
        err.reason,
        ValidationReason::TypeMismatch {
            expected: FieldKind::Integer,
            actual: "number",
        }
    );
}

#[test]
fn first_failure_in_declaration_order_wins() {
    let err = validate(&schema(), &args(json!({"count": "x"}))).expect_err("two failures");
    assert_eq!(err.field, "name");
}

#[test]
fn null_optional_field_takes_default() {
    let validated =
        validate(&schema(), &args(json!({"name": "a", "count": 1, "verbose": null})))
            .expect("valid");
    assert_eq!(validated.boolean("verbose"), Some(false));
}

#[test]
fn null_required_field_is_type_mismatch() {
    let err = validate(&schema(), &args(json!({"name": null, "count": 1}))).expect_err("null");
    assert_eq!(
        err.reason,
        ValidationReason::TypeMismatch {
            expected: FieldKind::String,
            actual: "null",
        }
    );
}

#[test]
fn error_message_names_field() {
    let err = validate(&schema(), &args(json!({}))).expect_err("empty");
    assert_eq!(err.to_string(), "invalid argument name: missing");
}

#[test]
fn require_str_fails_for_absent_field() {
    let validated = validate(&schema(), &args(json!({"name": "a", "count": 1}))).expect("valid");
    assert!(validated.require_str("note").is_err());
    assert_eq!(validated.require_str("name").expect("name"), "a");
}
