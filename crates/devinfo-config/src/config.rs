// crates/devinfo-config/src/config.rs
// ============================================================================
// Module: devinfo Configuration
// Description: Configuration loading and validation for the devinfo server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from an optional TOML file, then overlaid with the
//! `MCP_API_KEY`, `HOST`, and `PORT` environment variables exactly once.
//! Missing or invalid configuration fails closed. A server without a shared
//! secret only starts when `dev.allow_unauthenticated` is set explicitly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "devinfo.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DEVINFO_CONFIG";
/// Environment variable carrying the shared bearer secret.
pub const API_KEY_ENV_VAR: &str = "MCP_API_KEY";
/// Environment variable overriding the bind host.
pub const HOST_ENV_VAR: &str = "HOST";
/// Environment variable overriding the bind port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8001";
/// Default JSON-RPC endpoint path.
pub const DEFAULT_RPC_PATH: &str = "/rpc-endpoint";
/// Paths served by discovery routes that the RPC endpoint may not shadow.
const RESERVED_PATHS: &[&str] = &["/", "/health", "/tools"];
/// Maximum length of the RPC endpoint path.
pub(crate) const MAX_RPC_PATH_LENGTH: usize = 256;
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Upper bound for the request body size limit.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default per-call tool timeout in milliseconds.
pub(crate) const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;
/// Minimum per-call tool timeout in milliseconds.
pub(crate) const MIN_TOOL_TIMEOUT_MS: u64 = 100;
/// Maximum per-call tool timeout in milliseconds.
pub(crate) const MAX_TOOL_TIMEOUT_MS: u64 = 600_000;
/// Maximum length of the shared secret.
pub(crate) const MAX_API_KEY_LENGTH: usize = 256;
/// Maximum number of CORS origins.
pub(crate) const MAX_CORS_ORIGINS: usize = 64;
/// Maximum length of a single CORS origin.
pub(crate) const MAX_CORS_ORIGIN_LENGTH: usize = 512;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// devinfo server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevinfoConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Development-mode overrides (explicit opt-in only).
    #[serde(default)]
    pub dev: DevConfig,
    /// File the configuration was read from, if any (not deserialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl DevinfoConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &EnvOverrides::from_process())
    }

    /// Loads configuration using an explicit environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(path: Option<&Path>, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let config = Self::resolve(path, env)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file (if any) and applies environment overrides without
    /// validating, so callers can adjust flags before [`Self::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or overrides fail.
    pub fn resolve(path: Option<&Path>, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path, env)? {
            Some(resolved) => {
                let mut config = read_config_file(&resolved)?;
                config.source = Some(resolved);
                config
            }
            None => Self::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    /// Parses configuration from TOML text without applying env or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides on top of file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `HOST` cannot be resolved or `PORT` cannot be
    /// parsed.
    pub fn apply_env(&mut self, env: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(api_key) = &env.api_key {
            self.server.auth.api_key = Some(api_key.clone());
        }
        if env.host.is_none() && env.port.is_none() {
            return Ok(());
        }
        let current = self.server.bind_addr()?;
        let port = match &env.port {
            Some(port) => port.trim().parse::<u16>().map_err(|_| {
                ConfigError::Invalid(format!("{PORT_ENV_VAR} must be a port number"))
            })?,
            None => current.port(),
        };
        let ip = match &env.host {
            Some(host) => resolve_host(host.trim(), port)?,
            None => current.ip(),
        };
        self.server.bind = SocketAddr::new(ip, port).to_string();
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if !self.server.auth.is_enabled() && !self.dev.allow_unauthenticated {
            return Err(ConfigError::Invalid(format!(
                "no api key configured; set {API_KEY_ENV_VAR}, server.auth.api_key, or \
                 dev.allow_unauthenticated = true"
            )));
        }
        Ok(())
    }

    /// Returns true when bearer authentication is enforced.
    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.server.auth.is_enabled()
    }
}

/// Server configuration for the HTTP transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (`ip:port`).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Path of the JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Per-call tool timeout in milliseconds.
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,
    /// Inbound authentication configuration.
    #[serde(default)]
    pub auth: ServerAuthConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
    /// Cross-origin configuration.
    #[serde(default)]
    pub cors: ServerCorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            rpc_path: default_rpc_path(),
            max_body_bytes: default_max_body_bytes(),
            tool_timeout_ms: default_tool_timeout_ms(),
            auth: ServerAuthConfig::default(),
            audit: ServerAuditConfig::default(),
            cors: ServerCorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Returns the per-call tool timeout.
    #[must_use]
    pub const fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        validate_rpc_path(&self.rpc_path)?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_MAX_BODY_BYTES}"
            )));
        }
        if !(MIN_TOOL_TIMEOUT_MS ..= MAX_TOOL_TIMEOUT_MS).contains(&self.tool_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "tool_timeout_ms must be between {MIN_TOOL_TIMEOUT_MS} and {MAX_TOOL_TIMEOUT_MS}"
            )));
        }
        self.auth.validate()?;
        self.audit.validate()?;
        self.cors.validate()?;
        Ok(())
    }
}

/// Inbound authentication configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuthConfig {
    /// Shared bearer secret; absent disables authentication.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ServerAuthConfig {
    /// Returns true when a shared secret is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validates auth configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let Some(api_key) = &self.api_key else {
            return Ok(());
        };
        if api_key.is_empty() {
            return Err(ConfigError::Invalid("server.auth.api_key must be non-empty".to_string()));
        }
        if api_key.len() > MAX_API_KEY_LENGTH {
            return Err(ConfigError::Invalid("server.auth.api_key exceeds max length".to_string()));
        }
        if api_key.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "server.auth.api_key must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ServerAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerAuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

/// Cross-origin resource sharing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerCorsConfig {
    /// Allowed origins; `*` allows any origin, empty disables CORS.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

impl ServerCorsConfig {
    /// Returns true when CORS headers should be emitted.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.allow_origins.is_empty()
    }

    /// Returns true when any origin is allowed.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|origin| origin.trim() == "*")
    }

    /// Validates CORS configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allow_origins.len() > MAX_CORS_ORIGINS {
            return Err(ConfigError::Invalid("too many server.cors.allow_origins".to_string()));
        }
        for origin in &self.allow_origins {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "server.cors.allow_origins entries must be non-empty".to_string(),
                ));
            }
            if trimmed.len() > MAX_CORS_ORIGIN_LENGTH {
                return Err(ConfigError::Invalid(
                    "server.cors.allow_origins entry exceeds max length".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Development-mode configuration (explicit opt-in only).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevConfig {
    /// Allow serving without a shared secret.
    #[serde(default)]
    pub allow_unauthenticated: bool,
}

// ============================================================================
// SECTION: Environment Overrides
// ============================================================================

/// Snapshot of the environment variables that influence configuration.
#[derive(Clone, Default)]
pub struct EnvOverrides {
    /// Config path override (`DEVINFO_CONFIG`).
    pub config_path: Option<String>,
    /// Shared secret (`MCP_API_KEY`).
    pub api_key: Option<String>,
    /// Bind host (`HOST`).
    pub host: Option<String>,
    /// Bind port (`PORT`).
    pub port: Option<String>,
}

impl EnvOverrides {
    /// Reads the overrides from the process environment. Empty values are ignored.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            config_path: read_env(CONFIG_ENV_VAR),
            api_key: read_env(API_KEY_ENV_VAR),
            host: read_env(HOST_ENV_VAR),
            port: read_env(PORT_ENV_VAR),
        }
    }
}

impl fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvOverrides")
            .field("config_path", &self.config_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI, environment, or the default filename.
///
/// Explicit and env-provided paths must exist; the default file is optional.
fn resolve_path(path: Option<&Path>, env: &EnvOverrides) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = &env.config_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Reads and parses a config file with size and encoding limits.
fn read_config_file(path: &Path) -> Result<DevinfoConfig, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    DevinfoConfig::from_toml(content)
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Resolves `HOST` to an address, accepting ip literals and hostnames.
fn resolve_host(host: &str, port: u16) -> Result<IpAddr, ConfigError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let invalid = || {
        ConfigError::Invalid(format!(
            "{HOST_ENV_VAR} must be an ip address or resolvable hostname: {host}"
        ))
    };
    if host.is_empty() {
        return Err(invalid());
    }
    let mut addrs = (host, port).to_socket_addrs().map_err(|_| invalid())?;
    addrs.next().map(|addr| addr.ip()).ok_or_else(invalid)
}

/// Validates the JSON-RPC endpoint path.
fn validate_rpc_path(path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Invalid("server.rpc_path must start with '/'".to_string()));
    }
    if path.len() > MAX_RPC_PATH_LENGTH {
        return Err(ConfigError::Invalid("server.rpc_path exceeds max length".to_string()));
    }
    if path.chars().any(|ch| ch.is_whitespace() || matches!(ch, '{' | '}' | '*' | ':')) {
        return Err(ConfigError::Invalid(
            "server.rpc_path contains unsupported characters".to_string(),
        ));
    }
    if RESERVED_PATHS.contains(&path) {
        return Err(ConfigError::Invalid(format!(
            "server.rpc_path must not shadow discovery route {path}"
        )));
    }
    Ok(())
}

/// Reads a non-empty environment variable.
fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default RPC endpoint path.
fn default_rpc_path() -> String {
    DEFAULT_RPC_PATH.to_string()
}

/// Default maximum request body size.
pub(crate) const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default per-call tool timeout.
pub(crate) const fn default_tool_timeout_ms() -> u64 {
    DEFAULT_TOOL_TIMEOUT_MS
}

/// Audit logging is on unless disabled explicitly.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
