// crates/apisanity-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and engine assembly helpers.
// Purpose: Ensure config sections map onto the registry and plan output.
// Dependencies: apisanity-cli main helpers
// ============================================================================

//! ## Overview
//! Validates argument parsing, registry assembly from config, and plan line
//! rendering.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use apisanity_core::HttpMethod;
use apisanity_core::PlannedCase;
use apisanity_core::TestCase;
use clap::Parser;
use serde_json::json;

use super::Cli;
use super::Commands;
use super::FormatArg;
use super::SanityConfig;
use super::build_engine;
use super::build_registry;
use super::render_planned;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const CONFIG: &str = r#"
[contract]
path = "widgets.json"

[run]
disable = ["get:/widgets/{id}"]

[static_values]
id = "w-1"

[[security]]
scheme = "token_auth"

[security.provider]
kind = "static"
token = "secret"
"#;

fn write_fixture() -> (tempfile::TempDir, SanityConfig) {
    let dir = tempfile::tempdir().unwrap();
    let contract = json!({
        "swagger": "2.0",
        "paths": {
            "/widgets/{id}": {
                "get": {
                    "parameters": [{"name": "id", "in": "path", "type": "string"}],
                    "responses": {"200": {"description": "ok"}, "404": {"description": "no"}}
                }
            },
            "/health": {"get": {"responses": {"200": {"description": "ok"}}}}
        }
    });
    fs::write(dir.path().join("widgets.json"), contract.to_string()).unwrap();
    let config_path = dir.path().join("apisanity.toml");
    fs::write(&config_path, CONFIG).unwrap();
    let config = SanityConfig::load(Some(&config_path)).unwrap();
    (dir, config)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn run_flags_parse() {
    let cli = Cli::try_parse_from([
        "apisanity",
        "run",
        "--config",
        "suite.toml",
        "--format",
        "json-lines",
        "--seed",
        "9",
    ])
    .unwrap();
    let Some(Commands::Run(command)) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(command.format, Some(FormatArg::JsonLines));
    assert_eq!(command.seed, Some(9));
}

#[test]
fn registry_carries_static_values_and_security() {
    let (_dir, config) = write_fixture();

    let registry = build_registry(&config);

    assert_eq!(registry.static_value("id"), Some(&json!("w-1")));
    assert!(registry.security_provider("token_auth").is_some());
}

#[test]
fn plan_marks_disabled_operations() {
    let (_dir, config) = write_fixture();

    let engine = build_engine(&config).unwrap();
    let lines: Vec<String> = engine.plan().iter().map(render_planned).collect();

    assert_eq!(lines, vec![
        "SKIP get /widgets/{id} 200",
        "SKIP get /widgets/{id} 404",
        "CASE get /health 200",
    ]);
}

#[test]
fn render_planned_uses_case_marker() {
    let planned = PlannedCase {
        case: TestCase {
            method: HttpMethod::Post,
            path_template: "/people".to_string(),
            status_code: 400,
            response: None,
        },
        skipped: false,
    };
    assert_eq!(render_planned(&planned), "CASE post /people 400");
}
