// crates/devinfo-config/src/lib.rs
// ============================================================================
// Module: devinfo Config Library
// Description: Canonical config model, environment overrides, and validation.
// Purpose: Single source of truth for devinfo.toml semantics.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! `devinfo-config` defines the configuration model for the devinfo MCP
//! server. Configuration is read once at startup from an optional TOML file,
//! overlaid with a small set of environment variables, and validated
//! fail-closed before any listener is bound.
//!
//! Security posture: config inputs are untrusted; running without a shared
//! secret requires an explicit development opt-in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
