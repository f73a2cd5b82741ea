// crates/devinfo-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for devinfo-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::io::Write;

use devinfo_config::DevinfoConfig;
use devinfo_config::EnvOverrides;
use tempfile::NamedTempFile;

/// Parses a TOML string into a `DevinfoConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<DevinfoConfig, String> {
    DevinfoConfig::from_toml(toml_str).map_err(|err| err.to_string())
}

/// Returns a config with defaults and a shared secret so it validates.
pub fn keyed_config() -> Result<DevinfoConfig, String> {
    config_from_toml("[server.auth]\napi_key = \"test-secret\"\n")
}

/// Returns an environment snapshot with no overrides set.
pub fn empty_env() -> EnvOverrides {
    EnvOverrides::default()
}

/// Writes TOML content to a temporary file.
pub fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    file.flush().map_err(|err| err.to_string())?;
    Ok(file)
}
