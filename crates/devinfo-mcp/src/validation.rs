// crates/devinfo-mcp/src/validation.rs
// ============================================================================
// Module: Input Validation
// Description: Required and typed field checks for tool arguments.
// Purpose: Reject malformed arguments before any handler runs.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`validate`] walks a tool's field specs in declaration order and stops at
//! the first failure, so error reporting is deterministic. Unknown argument
//! names are dropped (non-strict, forward compatible), absent optional fields
//! take their default, and an explicit `null` on an optional field counts as
//! absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::handler::ToolFailure;
use crate::registry::FieldKind;
use crate::registry::FieldSpec;
use crate::registry::json_type_name;

// ============================================================================
// SECTION: Validated Arguments
// ============================================================================

/// Arguments that passed validation, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArguments {
    /// Declared fields only.
    values: Map<String, Value>,
}

impl ValidatedArguments {
    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a string field.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Returns an integer field.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    /// Returns a boolean field.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// Returns a string field that the handler cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFailure`] when the field is absent or not a string.
    pub fn require_str(&self, name: &str) -> Result<&str, ToolFailure> {
        self.str(name).ok_or_else(|| ToolFailure::new(format!("argument {name} is unavailable")))
    }

    /// Returns the number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates raw arguments against field specs.
///
/// # Errors
///
/// Returns [`ValidationError`] for the first field, in declaration order,
/// that is missing or has the wrong type.
pub fn validate(
    schema: &[FieldSpec],
    raw: &Map<String, Value>,
) -> Result<ValidatedArguments, ValidationError> {
    let mut values = Map::new();
    for field in schema {
        let present = match raw.get(&field.name) {
            Some(Value::Null) if !field.required => None,
            other => other,
        };
        match present {
            Some(value) => {
                if !field.kind.matches(value) {
                    return Err(ValidationError {
                        field: field.name.clone(),
                        reason: ValidationReason::TypeMismatch {
                            expected: field.kind,
                            actual: json_type_name(value),
                        },
                    });
                }
                values.insert(field.name.clone(), value.clone());
            }
            None if field.required => {
                return Err(ValidationError {
                    field: field.name.clone(),
                    reason: ValidationReason::Missing,
                });
            }
            None => {
                if let Some(default) = &field.default {
                    values.insert(field.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(ValidatedArguments {
        values,
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reason a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    /// Required field is absent.
    Missing,
    /// Field value has the wrong runtime type.
    TypeMismatch {
        /// Declared kind.
        expected: FieldKind,
        /// Observed JSON type label.
        actual: &'static str,
    },
}

impl ValidationReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::TypeMismatch {
                ..
            } => "type mismatch",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::TypeMismatch {
                expected,
                actual,
            } => write!(f, "type mismatch (expected {}, got {actual})", expected.as_str()),
        }
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument {field}: {reason}")]
pub struct ValidationError {
    /// Offending field name.
    pub field: String,
    /// Failure reason.
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Returns the JSON-RPC `error.data` payload for this failure.
    #[must_use]
    pub fn to_data(&self) -> Value {
        match self.reason {
            ValidationReason::Missing => json!({
                "field": self.field,
                "reason": self.reason.as_str(),
            }),
            ValidationReason::TypeMismatch {
                expected,
                actual,
            } => json!({
                "field": self.field,
                "reason": self.reason.as_str(),
                "expected": expected.as_str(),
                "actual": actual,
            }),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
