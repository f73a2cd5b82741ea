// crates/devinfo-cli/src/main.rs
// ============================================================================
// Module: devinfo CLI Entry Point
// Description: Command dispatcher for the devinfo MCP server.
// Purpose: Start the server, list built-in tools, and check configuration.
// Dependencies: clap, devinfo-config, devinfo-mcp, thiserror, tokio, tracing.
// ============================================================================

//! ## Overview
//! `devinfo serve` loads configuration, builds the built-in registry, and
//! serves until Ctrl-C. `devinfo tools` prints the `tools/list` result and
//! `devinfo config check` validates configuration without binding a socket.
//! Process logs go to stderr through `tracing`; stdout carries command output
//! only.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use devinfo_config::DevinfoConfig;
use devinfo_config::EnvOverrides;
use devinfo_mcp::McpServer;
use devinfo_mcp::builtin_registry;
use devinfo_mcp::response::ToolListResult;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "devinfo", version, about = "HTTP MCP server for developer information tools")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the MCP server.
    Serve(ServeCommand),
    /// Print the built-in tool descriptors as JSON.
    Tools,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to devinfo.toml or `DEVINFO_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Serve without a shared secret when none is configured.
    #[arg(long)]
    dev: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, then print a summary.
    Check(ConfigCheckCommand),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to devinfo.toml or `DEVINFO_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools => command_tools(),
        Commands::Config {
            command: ConfigCommand::Check(command),
        } => command_config_check(&command),
    }
}

/// Installs the stderr `tracing` subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref(), &EnvOverrides::from_process(), command.dev)?;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `tools` command.
fn command_tools() -> CliResult<ExitCode> {
    let registry = builtin_registry()
        .map_err(|err| CliError::new(format!("registry init failed: {err}")))?;
    let listing = ToolListResult {
        tools: registry.list(),
    };
    let rendered = serde_json::to_string_pretty(&listing)
        .map_err(|err| CliError::new(format!("tool listing serialization failed: {err}")))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config check` command.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref(), &EnvOverrides::from_process(), false)?;
    for line in config_summary(&config) {
        write_stdout_line(&line)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration, applying `--dev` before validation.
fn load_config(path: Option<&Path>, env: &EnvOverrides, dev: bool) -> CliResult<DevinfoConfig> {
    let mut config = DevinfoConfig::resolve(path, env)
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    if dev && !config.dev.allow_unauthenticated {
        tracing::warn!("--dev set: unauthenticated serving allowed when no api key is configured");
        config.dev.allow_unauthenticated = true;
    }
    config.validate().map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    Ok(config)
}

/// Renders a human-readable configuration summary.
fn config_summary(config: &DevinfoConfig) -> Vec<String> {
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    let auth = if config.auth_enabled() {
        "bearer token required"
    } else {
        "disabled (development mode)"
    };
    let cors = if config.server.cors.is_enabled() {
        config.server.cors.allow_origins.join(", ")
    } else {
        "off".to_string()
    };
    let audit = match (&config.server.audit.path, config.server.audit.enabled) {
        (_, false) => "off".to_string(),
        (Some(path), true) => path.clone(),
        (None, true) => "stderr".to_string(),
    };
    vec![
        "config ok".to_string(),
        format!("source: {source}"),
        format!("bind: {}", config.server.bind),
        format!("rpc path: {}", config.server.rpc_path),
        format!("auth: {auth}"),
        format!("max body bytes: {}", config.server.max_body_bytes),
        format!("tool timeout ms: {}", config.server.tool_timeout_ms),
        format!("audit: {audit}"),
        format!("cors: {cors}"),
    ]
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
