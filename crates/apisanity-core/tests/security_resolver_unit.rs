// crates/apisanity-core/tests/security_resolver_unit.rs
// ============================================================================
// Module: Security Resolver Unit Tests
// Description: Scheme selection and credential header mapping.
// Purpose: Ensure credentials map to headers exactly and bad shapes are rejected.
// ============================================================================

//! Security resolver tests for scheme selection and header mapping.

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

use std::collections::BTreeMap;

use apisanity_core::HttpMethod;
use apisanity_core::ProviderRegistry;
use apisanity_core::SecurityContext;
use apisanity_core::SecurityRequirement;
use apisanity_core::runtime::SecurityError;
use apisanity_core::runtime::SecurityResolver;
use apisanity_core::runtime::credential_headers;
use apisanity_core::security_fn;
use serde_json::json;

fn requirement(scheme: &str) -> SecurityRequirement {
    SecurityRequirement {
        scheme: scheme.to_string(),
        scopes: vec!["read".to_string()],
    }
}

async fn resolve(
    registry: &ProviderRegistry,
    requirements: &[SecurityRequirement],
    force: bool,
) -> Result<BTreeMap<String, String>, SecurityError> {
    let mut definitions = BTreeMap::new();
    definitions.insert("oauth".to_string(), json!({"type": "oauth2"}));
    let resolver = SecurityResolver::new(registry, &definitions, force);
    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_string(), "application/json".to_string());
    resolver.resolve_headers(requirements, "/p", HttpMethod::Get, 200, &mut headers).await?;
    Ok(headers)
}

#[test]
fn string_result_sets_only_authorization() {
    let headers = credential_headers("s", json!("Bearer x")).unwrap();
    assert_eq!(headers, vec![("Authorization".to_string(), "Bearer x".to_string())]);
}

#[test]
fn object_result_sets_exactly_its_keys() {
    let headers = credential_headers("s", json!({"X-A": "a", "X-B": false, "X-C": 1.5})).unwrap();
    let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["X-A", "X-B", "X-C"]);
    assert_eq!(headers[1].1, "false");
}

#[test]
fn other_shapes_are_configuration_errors() {
    for value in [json!(null), json!(3), json!(true), json!(["a"]), json!({"X": {"nested": 1}})] {
        let err = credential_headers("s", value).unwrap_err();
        assert!(matches!(err, SecurityError::UnsupportedResult { .. }));
    }
}

#[tokio::test]
async fn first_declared_scheme_with_provider_wins() {
    let mut registry = ProviderRegistry::new();
    registry.register_security(
        "oauth",
        security_fn(|ctx: SecurityContext| async move {
            let scheme = ctx.scheme.unwrap();
            assert_eq!(scheme.scopes, vec!["read".to_string()]);
            assert_eq!(scheme.definition, Some(json!({"type": "oauth2"})));
            Ok(json!("from-oauth"))
        }),
    );
    registry.register_security("key", security_fn(|_ctx| async { Ok(json!("from-key")) }));
    let requirements = [requirement("unregistered"), requirement("oauth"), requirement("key")];

    let headers = resolve(&registry, &requirements, false).await.unwrap();

    assert_eq!(headers.get("Authorization").map(String::as_str), Some("from-oauth"));
    assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn undeclared_security_is_left_alone_without_force() {
    let mut registry = ProviderRegistry::new();
    registry.register_security("key", security_fn(|_ctx| async { Ok(json!("k")) }));

    let headers = resolve(&registry, &[], false).await.unwrap();
    assert_eq!(headers.len(), 1);

    let forced = resolve(&registry, &[], true).await.unwrap();
    assert_eq!(forced.get("Authorization").map(String::as_str), Some("k"));
}

#[tokio::test]
async fn empty_registry_leaves_headers_unchanged() {
    let registry = ProviderRegistry::new();
    let headers = resolve(&registry, &[requirement("oauth")], true).await.unwrap();
    let expected: BTreeMap<String, String> =
        [("Accept".to_string(), "application/json".to_string())].into_iter().collect();
    assert_eq!(headers, expected);
}
