// crates/devinfo-mcp/src/registry.rs
// ============================================================================
// Module: Tool Registry
// Description: Name to descriptor and handler mapping for MCP tools.
// Purpose: Provide the single extension point for tool registration.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated once before the server accepts traffic and is
//! read-only afterwards, so lookups take `&self` and need no locking. Listing
//! preserves registration order.
//!
//! Security posture: descriptors are only published after the auth guard
//! passes; see [`crate::auth`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::handler::ToolHandler;

// ============================================================================
// SECTION: Field Specs
// ============================================================================

/// Runtime type accepted for a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON integer (fractional numbers are rejected).
    Integer,
    /// JSON boolean.
    Boolean,
}

impl FieldKind {
    /// Returns the JSON Schema type label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    /// Returns true when the value has this kind.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Returns the JSON type label of a runtime value.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) => {
            if number.is_f64() {
                "number"
            } else {
                "integer"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declaration of one argument accepted by a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Argument name.
    pub name: String,
    /// Expected runtime type.
    pub kind: FieldKind,
    /// Whether the argument must be present.
    pub required: bool,
    /// Value used when an optional argument is absent.
    pub default: Option<Value>,
    /// Human-readable description published in the schema.
    pub description: String,
}

impl FieldSpec {
    /// Declares a required argument.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: String::new(),
        }
    }

    /// Declares an optional argument without a default.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    /// Sets the default used when the argument is absent.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the published description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Renders the JSON Schema property for this field.
    fn schema_property(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), Value::String(self.kind.as_str().to_string()));
        if !self.description.is_empty() {
            property.insert("description".to_string(), Value::String(self.description.clone()));
        }
        if let Some(default) = &self.default {
            property.insert("default".to_string(), default.clone());
        }
        Value::Object(property)
    }
}

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Published description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Unique kebab-case tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared arguments, serialized as a JSON Schema object.
    #[serde(rename = "inputSchema", serialize_with = "serialize_input_schema")]
    pub input_schema: Vec<FieldSpec>,
}

impl ToolDescriptor {
    /// Builds a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Vec<FieldSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Returns the JSON Schema object for the declared arguments.
    #[must_use]
    pub fn input_schema_json(&self) -> Value {
        schema_object(&self.input_schema)
    }
}

/// Builds `{"type":"object","properties":{..},"required":[..]}` for fields.
fn schema_object(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.clone(), field.schema_property());
    }
    let required: Vec<&str> =
        fields.iter().filter(|field| field.required).map(|field| field.name.as_str()).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Serializes field specs as a JSON Schema object.
fn serialize_input_schema<S: Serializer>(
    fields: &[FieldSpec],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    schema_object(fields).serialize(serializer)
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry entry pairing a descriptor with its handler.
pub struct RegisteredTool {
    /// Published descriptor.
    descriptor: ToolDescriptor,
    /// Opaque handler capability.
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    /// Returns the tool descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Returns a shared reference to the handler.
    #[must_use]
    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }
}

/// Immutable-after-construction tool registry.
///
/// # Invariants
/// - Tool names are unique.
/// - `list` returns descriptors in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    /// Entries in registration order.
    entries: Vec<RegisteredTool>,
    /// Name to entry index.
    index: BTreeMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is taken or malformed, or the
    /// field specs are inconsistent.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if !is_kebab_case(&descriptor.name) {
            return Err(RegistryError::InvalidName(descriptor.name));
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }
        validate_fields(&descriptor)?;
        self.index.insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Looks up a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no tool has this name.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, RegistryError> {
        self.index
            .get(name)
            .and_then(|idx| self.entries.get(*idx))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Returns descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.entries.iter().map(RegisteredTool::descriptor).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no tools are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),
    /// Tool name is not kebab-case.
    #[error("invalid tool name: {0:?}")]
    InvalidName(String),
    /// Field specs are inconsistent.
    #[error("invalid schema for {tool}: {reason}")]
    InvalidSchema {
        /// Tool name.
        tool: String,
        /// Failure description.
        reason: String,
    },
    /// No tool has this name.
    #[error("tool not found: {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for names matching `[a-z0-9]+(-[a-z0-9]+)*`.
fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|segment| {
            !segment.is_empty()
                && segment.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit())
        })
}

/// Checks field name uniqueness and default/kind agreement.
fn validate_fields(descriptor: &ToolDescriptor) -> Result<(), RegistryError> {
    let mut seen = BTreeSet::new();
    for field in &descriptor.input_schema {
        if field.name.is_empty() {
            return Err(RegistryError::InvalidSchema {
                tool: descriptor.name.clone(),
                reason: "field name must be non-empty".to_string(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(RegistryError::InvalidSchema {
                tool: descriptor.name.clone(),
                reason: format!("duplicate field {}", field.name),
            });
        }
        if let Some(default) = &field.default
            && !field.kind.matches(default)
        {
            return Err(RegistryError::InvalidSchema {
                tool: descriptor.name.clone(),
                reason: format!("default for {} is not {}", field.name, field.kind.as_str()),
            });
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
