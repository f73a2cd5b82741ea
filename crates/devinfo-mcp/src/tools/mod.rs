// crates/devinfo-mcp/src/tools/mod.rs
// ============================================================================
// Module: Built-in Tools
// Description: Developer-information tools registered by default.
// Purpose: Provide the stock registry served by the devinfo binary.
// Dependencies: devinfo-mcp registry and handler contracts
// ============================================================================

//! ## Overview
//! Each built-in tool is a pure `(arguments) -> text` function over static
//! catalogues, wrapped with [`sync_handler`]. [`builtin_registry`] registers
//! them in a fixed order, which is also the `tools/list` order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod code_analysis;
pub mod environment_tools;
pub mod project_info;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::handler::sync_handler;
use crate::registry::RegistryError;
use crate::registry::ToolRegistry;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a registry holding the built-in tools.
///
/// # Errors
///
/// Returns [`RegistryError`] if a built-in descriptor is rejected.
pub fn builtin_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(project_info::descriptor(), sync_handler(project_info::handle))?;
    registry.register(environment_tools::descriptor(), sync_handler(environment_tools::handle))?;
    registry.register(code_analysis::descriptor(), sync_handler(code_analysis::handle))?;
    Ok(registry)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Title-cases words: a letter is uppercased when it does not follow another
/// letter, and lowercased otherwise (`build_tool` becomes `Build_Tool`).
pub(crate) fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            output.push(ch);
            previous_is_letter = false;
        }
    }
    output
}

// ============================================================================
// SECTION: Tests
// ============================================================================
