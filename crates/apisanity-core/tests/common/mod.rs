// crates/apisanity-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for apisanity-core integration tests.
// Purpose: Provide recording transports, fixed generators, and contract builders.
// Dependencies: apisanity-core, serde_json
// ============================================================================

//! ## Overview
//! Provides in-memory collaborators so engine tests run without a network,
//! plus small builders for contract fixtures.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use apisanity_core::CaseRequest;
use apisanity_core::CaseResponse;
use apisanity_core::ContractSpec;
use apisanity_core::Endpoint;
use apisanity_core::FakeGenerator;
use apisanity_core::GeneratorError;
use apisanity_core::HttpMethod;
use apisanity_core::Operation;
use apisanity_core::ParamLocation;
use apisanity_core::ParamSpec;
use apisanity_core::ResponseSpec;
use apisanity_core::RunEvent;
use apisanity_core::RunReporter;
use apisanity_core::SchemaValidator;
use apisanity_core::SecurityRequirement;
use apisanity_core::Transport;
use apisanity_core::TransportError;
use apisanity_core::ValidationReport;
use apisanity_core::ValidatorError;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Responder signature used by [`RecordingTransport`].
pub type Responder = dyn Fn(&CaseRequest) -> Result<CaseResponse, TransportError> + Send + Sync;

/// Transport that records requests and answers through a closure.
#[derive(Clone)]
pub struct RecordingTransport {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<CaseRequest>>>,
}

impl RecordingTransport {
    /// Creates a transport answering every request with `responder`.
    pub fn new(
        responder: impl Fn(&CaseRequest) -> Result<CaseResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a transport answering every request with a fixed status and body.
    pub fn fixed(status: u16, body: Value) -> Self {
        Self::new(move |_request| {
            Ok(CaseResponse {
                status,
                body: body.clone(),
            })
        })
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<CaseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &CaseRequest) -> Result<CaseResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Generator producing fixed literals per schema type.
///
/// Objects are filled from `properties` recursively; arrays get one item.
pub struct LiteralGenerator;

impl FakeGenerator for LiteralGenerator {
    fn generate(&self, schema: &Value) -> Result<Value, GeneratorError> {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let mut out = serde_json::Map::new();
            for (name, child) in properties {
                out.insert(name.clone(), self.generate(child)?);
            }
            return Ok(Value::Object(out));
        }
        match schema.get("type").and_then(Value::as_str) {
            Some("string") => Ok(json!("text")),
            Some("integer") => Ok(json!(11)),
            Some("number") => Ok(json!(1.5)),
            Some("boolean") => Ok(json!(true)),
            Some("array") => {
                let items = schema.get("items").cloned().unwrap_or_else(|| json!({}));
                Ok(Value::Array(vec![self.generate(&items)?]))
            }
            Some("object") | None => Ok(json!({})),
            Some(other) => Err(GeneratorError::Unsupported(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator checking `type` and `required` at the top level only.
pub struct ShallowValidator;

impl SchemaValidator for ShallowValidator {
    fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<ValidationReport, ValidatorError> {
        let mut errors = Vec::new();
        match schema.get("type").and_then(Value::as_str) {
            Some("object") if !instance.is_object() => errors.push("expected object".to_string()),
            Some("string") if !instance.is_string() => errors.push("expected string".to_string()),
            _ => {}
        }
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if instance.get(name).is_none() {
                    errors.push(format!("missing property {name}"));
                }
            }
        }
        if errors.is_empty() {
            return Ok(ValidationReport::accepted());
        }
        Ok(ValidationReport::rejected(errors))
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Reporter collecting events in memory.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    events: Arc<Mutex<Vec<RunEvent>>>,
}

impl MemoryReporter {
    /// Returns every recorded event.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Counts recorded skip events.
    pub fn skipped(&self) -> usize {
        self.events().iter().filter(|event| matches!(event, RunEvent::CaseSkipped { .. })).count()
    }
}

impl RunReporter for MemoryReporter {
    fn record(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Contract Builders
// ============================================================================

/// Builds a parameter spec.
pub fn param(name: &str, location: ParamLocation, param_type: Option<&str>) -> ParamSpec {
    ParamSpec {
        name: name.to_string(),
        location,
        param_type: param_type.map(str::to_string),
        required: true,
        schema: None,
    }
}

/// Builds a body parameter with the given schema.
pub fn body_param(schema: Value) -> ParamSpec {
    ParamSpec {
        name: "body".to_string(),
        location: ParamLocation::Body,
        param_type: None,
        required: true,
        schema: Some(schema),
    }
}

/// Builds an operation with the given parameters and responses.
pub fn operation(
    method: HttpMethod,
    parameters: Vec<ParamSpec>,
    responses: &[(u16, Option<Value>)],
) -> Operation {
    Operation {
        method,
        parameters,
        responses: responses
            .iter()
            .map(|(status, schema)| {
                (*status, ResponseSpec {
                    description: None,
                    schema: schema.clone(),
                })
            })
            .collect::<BTreeMap<_, _>>(),
        security: Vec::new(),
        consumes: Vec::new(),
    }
}

/// Adds a security requirement to an operation.
pub fn secured(mut operation: Operation, scheme: &str) -> Operation {
    operation.security.push(SecurityRequirement {
        scheme: scheme.to_string(),
        scopes: Vec::new(),
    });
    operation
}

/// Builds a contract from endpoints.
pub fn contract(base_path: &str, endpoints: Vec<(&str, Vec<Operation>)>) -> ContractSpec {
    ContractSpec {
        base_path: base_path.to_string(),
        endpoints: endpoints
            .into_iter()
            .map(|(template, operations)| Endpoint {
                template: template.to_string(),
                operations,
            })
            .collect(),
        security_definitions: BTreeMap::new(),
    }
}

/// Widgets contract: `GET /widgets/{id}` answering 200 or 404.
pub fn widgets_contract() -> ContractSpec {
    let get = secured(
        operation(HttpMethod::Get, vec![param("id", ParamLocation::Path, Some("string"))], &[
            (
                200,
                Some(json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}}
                })),
            ),
            (404, None),
        ]),
        "token_auth",
    );
    let mut spec = contract("/api", vec![("/widgets/{id}", vec![get])]);
    spec.security_definitions.insert(
        "token_auth".to_string(),
        json!({"type": "apiKey", "name": "Authorization", "in": "header"}),
    );
    spec
}
