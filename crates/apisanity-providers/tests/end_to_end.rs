// crates/apisanity-providers/tests/end_to_end.rs
// ============================================================================
// Module: End-to-End Run Tests
// Description: Contract-driven runs against live local targets.
// Purpose: Exercise loader, engine, transport, generator, and validator together.
// ============================================================================

//! End-to-end runs over loaded contracts and local `tiny_http` targets.

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

mod common;

use std::sync::Arc;

use apisanity_contract::ContractFormat;
use apisanity_contract::parse_contract;
use apisanity_core::ContractSpec;
use apisanity_core::NoopReporter;
use apisanity_core::ParamContext;
use apisanity_core::ProviderRegistry;
use apisanity_core::RunOptions;
use apisanity_core::RunReporter;
use apisanity_core::RunTally;
use apisanity_core::SanityEngine;
use apisanity_core::param_fn;
use apisanity_providers::GeneratorOptions;
use apisanity_providers::HttpTransport;
use apisanity_providers::HttpTransportConfig;
use apisanity_providers::JsonLinesReporter;
use apisanity_providers::JsonSchemaValidator;
use apisanity_providers::RandomFakeGenerator;
use apisanity_providers::StaticSecurityProvider;
use common::TestServer;
use common::json_reply;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn widgets_contract() -> ContractSpec {
    let document = json!({
        "swagger": "2.0",
        "basePath": "/api",
        "securityDefinitions": {
            "token_auth": {"type": "apiKey", "name": "Authorization", "in": "header"}
        },
        "paths": {
            "/widgets/{id}": {
                "get": {
                    "security": [{"token_auth": []}],
                    "parameters": [{"name": "id", "in": "path", "type": "string"}],
                    "responses": {
                        "200": {
                            "description": "found",
                            "schema": {
                                "type": "object",
                                "properties": {"name": {"type": "string"}}
                            }
                        },
                        "404": {"description": "missing"}
                    }
                }
            }
        }
    });
    parse_contract(&serde_json::to_vec(&document).unwrap(), ContractFormat::Json).unwrap()
}

fn people_contract() -> ContractSpec {
    let document = json!({
        "swagger": "2.0",
        "paths": {
            "/people": {
                "post": {
                    "parameters": [{"name": "age", "in": "query", "type": "integer"}],
                    "responses": {
                        "200": {"description": "created"},
                        "400": {"description": "rejected"}
                    }
                }
            }
        }
    });
    parse_contract(&serde_json::to_vec(&document).unwrap(), ContractFormat::Json).unwrap()
}

/// Widgets target: requires `Authorization: secret`, knows widget `w-1`.
fn widgets_server(name: Value) -> TestServer {
    TestServer::start(move |request| {
        if request.header("authorization") != Some("secret") {
            return json_reply(401, r#"{"message": "unauthorized"}"#);
        }
        if request.path() == "/api/widgets/w-1" {
            return json_reply(200, &json!({"name": name}).to_string());
        }
        json_reply(404, r#"{"message": "not found"}"#)
    })
}

/// People target: rejects a non-integer `age` with 400.
fn people_server() -> TestServer {
    TestServer::start(|request| match request.query("age") {
        Some(age) if age.parse::<i64>().is_err() => json_reply(400, r#"{"error": "age"}"#),
        _ => json_reply(200, "{}"),
    })
}

fn secured_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_security("token_auth", StaticSecurityProvider::token("secret"));
    registry
}

async fn run_with<R: RunReporter>(
    contract: ContractSpec,
    registry: ProviderRegistry,
    server: &TestServer,
    reporter: R,
) -> RunTally {
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: server.base_url.clone(),
        ..HttpTransportConfig::default()
    })
    .unwrap();
    let generator = RandomFakeGenerator::new(GeneratorOptions {
        seed: Some(42),
        ..GeneratorOptions::default()
    });
    let engine = SanityEngine::new(
        contract,
        registry,
        RunOptions::default(),
        transport,
        generator,
        JsonSchemaValidator::default(),
        reporter,
    );
    engine.run().await.unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn widgets_without_id_provider_leave_placeholder_in_path() {
    let server = widgets_server(json!("gizmo"));

    let tally = run_with(widgets_contract(), secured_registry(), &server, NoopReporter).await;

    assert_eq!(tally, RunTally {
        fails: 1,
        passes: 1,
    });
    let paths: Vec<String> =
        server.requests().iter().map(|request| request.path().to_string()).collect();
    assert_eq!(paths, vec!["/api/widgets/%7Bid%7D", "/api/widgets/%7Bid%7D"]);
}

#[tokio::test]
async fn widgets_with_id_provider_pass_both_cases() {
    let server = widgets_server(json!("gizmo"));
    let mut registry = secured_registry();
    registry.register_param(
        "id",
        param_fn(|ctx: ParamContext| async move {
            Ok((ctx.status_code == 200).then(|| json!("w-1")))
        }),
    );

    let tally = run_with(widgets_contract(), registry, &server, NoopReporter).await;

    assert_eq!(tally, RunTally {
        fails: 0,
        passes: 2,
    });
}

#[tokio::test]
async fn schema_violations_are_reported_as_json_lines() {
    let server = widgets_server(json!(5));
    let mut registry = secured_registry();
    registry.register_param("id", param_fn(|_ctx: ParamContext| async { Ok(Some(json!("w-1"))) }));
    let reporter = Arc::new(JsonLinesReporter::new(Vec::new()));

    let tally = run_with(widgets_contract(), registry, &server, Arc::clone(&reporter)).await;

    assert_eq!(tally, RunTally {
        fails: 2,
        passes: 0,
    });
    let output = Arc::try_unwrap(reporter).ok().unwrap().into_inner().unwrap();
    let records: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = records
        .iter()
        .filter_map(|record| record["failure"]["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["schema_violation", "status_mismatch"]);
    assert_eq!(records.last().unwrap()["event"], "run_summary");
}

#[tokio::test]
async fn missing_credentials_fail_every_case() {
    let server = widgets_server(json!("gizmo"));

    let tally = run_with(widgets_contract(), ProviderRegistry::new(), &server, NoopReporter).await;

    assert_eq!(tally, RunTally {
        fails: 2,
        passes: 0,
    });
    assert!(server.requests().iter().all(|request| request.header("authorization").is_none()));
}

#[tokio::test]
async fn integer_query_gets_string_value_at_400() {
    let server = people_server();

    let tally = run_with(people_contract(), ProviderRegistry::new(), &server, NoopReporter).await;

    assert_eq!(tally, RunTally {
        fails: 0,
        passes: 2,
    });
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query("age"), None);
    let sent = requests[1].query("age").unwrap();
    assert!(!sent.is_empty());
    assert!(sent.parse::<i64>().is_err());
}
