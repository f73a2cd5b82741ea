// crates/devinfo-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and config loading in the CLI.
// Purpose: Ensure `--dev` is the only path to unauthenticated serving.
// Dependencies: devinfo-cli main helpers
// ============================================================================

//! ## Overview
//! Validates subcommand parsing, `--dev` handling, and the config summary.
//!
//! Security posture: a missing secret must fail closed unless opted in.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use clap::Parser;
use devinfo_config::EnvOverrides;
use tempfile::NamedTempFile;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::config_summary;
use super::load_config;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Writes `content` to a temporary TOML file.
fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

#[test]
fn serve_parses_config_and_dev_flags() {
    let cli = Cli::try_parse_from(["devinfo", "serve", "--config", "x.toml", "--dev"]).unwrap();
    let Commands::Serve(command) = cli.command else {
        panic!("expected serve command");
    };
    assert!(command.dev);
    assert_eq!(command.config.as_deref(), Some(std::path::Path::new("x.toml")));
}

#[test]
fn config_check_parses() {
    let cli = Cli::try_parse_from(["devinfo", "config", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommand::Check(_),
        }
    ));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["devinfo"]).is_err());
}

// ============================================================================
// SECTION: Config Loading Tests
// ============================================================================

#[test]
fn missing_secret_without_dev_fails() {
    let file = config_file("");
    let err = load_config(Some(file.path()), &EnvOverrides::default(), false).unwrap_err();
    assert!(err.to_string().contains("no api key configured"));
}

#[test]
fn dev_flag_allows_missing_secret() {
    let file = config_file("");
    let config = load_config(Some(file.path()), &EnvOverrides::default(), true).unwrap();
    assert!(config.dev.allow_unauthenticated);
    assert!(!config.auth_enabled());
}

#[test]
fn env_secret_enables_auth() {
    let file = config_file("");
    let env = EnvOverrides {
        api_key: Some("cli-secret".to_string()),
        ..EnvOverrides::default()
    };
    let config = load_config(Some(file.path()), &env, false).unwrap();
    assert!(config.auth_enabled());
}

// ============================================================================
// SECTION: Summary Tests
// ============================================================================

#[test]
fn summary_reports_auth_and_never_the_secret() {
    let file = config_file("[server.auth]\napi_key = \"hidden-value\"\n\n[server.audit]\nenabled = false\n");
    let config = load_config(Some(file.path()), &EnvOverrides::default(), false).unwrap();
    let summary = config_summary(&config);
    assert_eq!(summary[0], "config ok");
    assert!(summary.contains(&"auth: bearer token required".to_string()));
    assert!(summary.contains(&"audit: off".to_string()));
    assert!(summary.contains(&"rpc path: /rpc-endpoint".to_string()));
    assert!(summary.iter().all(|line| !line.contains("hidden-value")));
}
