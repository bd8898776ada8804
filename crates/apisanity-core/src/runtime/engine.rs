// crates/apisanity-core/src/runtime/engine.rs
// ============================================================================
// Module: API Sanity Execution Engine
// Description: Contract traversal, request dispatch, and pass/fail tallying.
// Purpose: Execute every planned test case against the system under test.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The engine walks endpoints, operations, and planned cases in declaration
//! order and runs each case strictly after the previous one. Every case either
//! passes or fails on its own; provider errors, unsupported credentials,
//! transport errors, and assertion failures never stop the traversal.
//!
//! The only early exit is an abort: a triggered [`RunAbort`] or a provider
//! reporting a defect. The run then returns [`EngineError::Aborted`] with the
//! tally accumulated so far.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::core::CaseFailure;
use crate::core::CaseRequest;
use crate::core::ContractSpec;
use crate::core::Endpoint;
use crate::core::Operation;
use crate::core::ParamLocation;
use crate::core::ParamSpec;
use crate::core::PlannedCase;
use crate::core::RunOptions;
use crate::core::RunTally;
use crate::core::TestCase;
use crate::core::fill_template;
use crate::interfaces::CaseLabel;
use crate::interfaces::FakeGenerator;
use crate::interfaces::ParamContext;
use crate::interfaces::ProviderError;
use crate::interfaces::RunEvent;
use crate::interfaces::RunReporter;
use crate::interfaces::SchemaValidator;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;
use crate::interfaces::ValidatorError;
use crate::runtime::abort::RunAbort;
use crate::runtime::payload::PayloadError;
use crate::runtime::payload::PayloadSynthesizer;
use crate::runtime::planner::plan_cases;
use crate::runtime::registry::ProviderRegistry;
use crate::runtime::resolver::ParamResolver;
use crate::runtime::resolver::ResolveError;
use crate::runtime::security::SecurityError;
use crate::runtime::security::SecurityResolver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type used when the operation declares no `consumes` entry.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Header carrying the request body content type.
const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Message used when a schema violation carries no error detail.
const GENERIC_SCHEMA_VIOLATION: &str = "response body does not match the declared schema";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Run-level errors.
///
/// # Invariants
/// - Case-level problems never surface here; they are counted in the tally.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run stopped before every case was evaluated.
    #[error("run aborted: {reason}")]
    Aborted {
        /// Abort reason.
        reason: String,
        /// Tally at the time of the abort.
        tally: RunTally,
    },
}

/// Outcome of a case that did not pass.
enum CaseError {
    /// Counted failure; the run continues.
    Failure(CaseFailure),
    /// Defect that stops the run.
    Defect(String),
}

impl From<ProviderError> for CaseError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Failed(message) => Self::Failure(CaseFailure::Provider {
                message,
            }),
            ProviderError::Defect(reason) => Self::Defect(reason),
        }
    }
}

impl From<ResolveError> for CaseError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Provider(err) => err.into(),
            err @ ResolveError::Synthesis {
                ..
            } => Self::Failure(CaseFailure::Generator {
                message: err.to_string(),
            }),
        }
    }
}

impl From<PayloadError> for CaseError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Generator(message) => Self::Failure(CaseFailure::Generator {
                message,
            }),
            PayloadError::Resolve(err) => err.into(),
        }
    }
}

impl From<SecurityError> for CaseError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Provider(err) => err.into(),
            err @ SecurityError::UnsupportedResult {
                ..
            } => Self::Failure(CaseFailure::Configuration {
                message: err.to_string(),
            }),
        }
    }
}

impl From<TransportError> for CaseError {
    fn from(err: TransportError) -> Self {
        Self::Failure(CaseFailure::Transport {
            message: err.to_string(),
        })
    }
}

impl From<ValidatorError> for CaseError {
    fn from(err: ValidatorError) -> Self {
        Self::Failure(CaseFailure::Validator {
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Value Rendering
// ============================================================================

/// Renders a resolved value for a path, query, or header slot.
///
/// Strings are used verbatim, arrays are comma-joined, and everything else
/// uses its JSON text.
#[must_use]
pub fn render_param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(render_param_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Joins the contract base path with a resolved path.
fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return path.to_string();
    }
    format!("{base}{path}")
}

/// Returns the reporter label for a case.
fn case_label(case: &TestCase) -> CaseLabel {
    CaseLabel {
        method: case.method,
        path: case.path_template.clone(),
        status_code: case.status_code,
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Per-run collaborators borrowed from the engine.
struct RunScope<'e> {
    /// Parameter resolver.
    resolver: ParamResolver<'e>,
    /// Security header resolver.
    security: SecurityResolver<'e>,
}

/// Test-case derivation and execution engine.
///
/// # Invariants
/// - The contract and registry are never mutated by a run.
/// - Each [`SanityEngine::run`] starts from an empty tally.
pub struct SanityEngine<T, G, V, R> {
    /// Contract under test.
    contract: ContractSpec,
    /// Registered value providers.
    registry: ProviderRegistry,
    /// Planning and execution options.
    options: RunOptions,
    /// Handle to the system under test.
    transport: T,
    /// Fake-data generator.
    generator: G,
    /// Response schema validator.
    validator: V,
    /// Event sink.
    reporter: R,
    /// Cancellation handle.
    abort: RunAbort,
}

impl<T, G, V, R> SanityEngine<T, G, V, R>
where
    T: Transport,
    G: FakeGenerator,
    V: SchemaValidator,
    R: RunReporter,
{
    /// Creates an engine over a loaded contract and populated registry.
    #[must_use]
    pub fn new(
        contract: ContractSpec,
        registry: ProviderRegistry,
        options: RunOptions,
        transport: T,
        generator: G,
        validator: V,
        reporter: R,
    ) -> Self {
        Self {
            contract,
            registry,
            options,
            transport,
            generator,
            validator,
            reporter,
            abort: RunAbort::new(),
        }
    }

    /// Replaces the abort handle with one shared by the caller.
    #[must_use]
    pub fn with_abort(mut self, abort: RunAbort) -> Self {
        self.abort = abort;
        self
    }

    /// Returns a clone of the engine's abort handle.
    #[must_use]
    pub fn abort_handle(&self) -> RunAbort {
        self.abort.clone()
    }

    /// Returns the contract under test.
    #[must_use]
    pub const fn contract(&self) -> &ContractSpec {
        &self.contract
    }

    /// Returns the run options.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Plans every case without dispatching anything.
    #[must_use]
    pub fn plan(&self) -> Vec<PlannedCase> {
        let mut planned = Vec::new();
        for endpoint in &self.contract.endpoints {
            for operation in &endpoint.operations {
                let skipped = self.options.is_disabled(operation.method, &endpoint.template);
                let cases = plan_cases(
                    operation.method,
                    &endpoint.template,
                    &operation.responses,
                    &self.options,
                );
                planned.extend(cases.into_iter().map(|case| PlannedCase {
                    case,
                    skipped,
                }));
            }
        }
        planned
    }

    /// Executes every planned case and returns the tally.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Aborted`] when the abort handle fires or a
    /// provider reports a defect.
    pub async fn run(&self) -> Result<RunTally, EngineError> {
        let mut tally = RunTally::default();
        let scope = RunScope {
            resolver: ParamResolver::new(&self.registry, &self.generator),
            security: SecurityResolver::new(
                &self.registry,
                &self.contract.security_definitions,
                self.options.force_authorization_header,
            ),
        };
        for endpoint in &self.contract.endpoints {
            for operation in &endpoint.operations {
                let cases = plan_cases(
                    operation.method,
                    &endpoint.template,
                    &operation.responses,
                    &self.options,
                );
                if self.options.is_disabled(operation.method, &endpoint.template) {
                    for case in &cases {
                        self.reporter.record(&RunEvent::CaseSkipped {
                            case: case_label(case),
                        });
                    }
                    continue;
                }
                for case in &cases {
                    if let Some(reason) = self.abort.reason() {
                        return Err(self.aborted(reason, tally));
                    }
                    let outcome = tokio::select! {
                        biased;
                        reason = self.abort.triggered() => Err(CaseError::Defect(reason)),
                        outcome = self.execute_case(&scope, endpoint, operation, case) => outcome,
                    };
                    match outcome {
                        Ok(()) => {
                            tally.record_pass();
                            self.reporter.record(&RunEvent::CasePassed {
                                case: case_label(case),
                            });
                        }
                        Err(CaseError::Failure(failure)) => {
                            tally.record_fail();
                            self.reporter.record(&RunEvent::CaseFailed {
                                case: case_label(case),
                                failure,
                            });
                        }
                        Err(CaseError::Defect(reason)) => {
                            return Err(self.aborted(reason, tally));
                        }
                    }
                }
            }
        }
        self.reporter.record(&RunEvent::RunSummary {
            tally,
        });
        Ok(tally)
    }

    /// Reports an abort and builds the matching error.
    fn aborted(&self, reason: String, tally: RunTally) -> EngineError {
        self.reporter.record(&RunEvent::RunAborted {
            reason: reason.clone(),
            tally,
        });
        EngineError::Aborted {
            reason,
            tally,
        }
    }

    /// Builds, dispatches, and checks one case.
    async fn execute_case(
        &self,
        scope: &RunScope<'_>,
        endpoint: &Endpoint,
        operation: &Operation,
        case: &TestCase,
    ) -> Result<(), CaseError> {
        let request = self.build_request(scope, endpoint, operation, case).await?;
        let response = self.transport.send(&request).await?;
        if response.status != case.status_code {
            return Err(CaseError::Failure(CaseFailure::StatusMismatch {
                expected: case.status_code,
                actual: response.status,
            }));
        }
        if let Some(schema) = case.response_schema() {
            let report = self.validator.validate(schema, &response.body)?;
            if !report.is_valid() {
                let message = report
                    .errors
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| GENERIC_SCHEMA_VIOLATION.to_string());
                return Err(CaseError::Failure(CaseFailure::SchemaViolation {
                    message,
                }));
            }
        }
        Ok(())
    }

    /// Resolves every request part for one case.
    async fn build_request(
        &self,
        scope: &RunScope<'_>,
        endpoint: &Endpoint,
        operation: &Operation,
        case: &TestCase,
    ) -> Result<CaseRequest, CaseError> {
        let template = endpoint.template.as_str();
        let method = case.method;
        let status_code = case.status_code;
        let context = |param: &ParamSpec| ParamContext {
            key: param.name.clone(),
            location: param.location,
            declared_type: param.param_type.clone(),
            status_code,
            path: template.to_string(),
            method,
        };

        let mut path_values = BTreeMap::new();
        for param in operation.params_in(ParamLocation::Path) {
            if let Some(value) = scope.resolver.resolve(&context(param)).await? {
                path_values.insert(param.name.clone(), render_param_value(&value));
            }
        }
        let path = fill_template(template, &path_values);

        let mut query = Vec::new();
        for param in operation.params_in(ParamLocation::Query) {
            if let Some(value) = scope.resolver.resolve(&context(param)).await? {
                query.push((param.name.clone(), render_param_value(&value)));
            }
        }

        let mut headers = BTreeMap::new();
        for param in operation.params_in(ParamLocation::Header) {
            if let Some(value) = scope.resolver.resolve(&context(param)).await? {
                headers.insert(param.name.clone(), render_param_value(&value));
            }
        }
        scope
            .security
            .resolve_headers(&operation.security, template, method, status_code, &mut headers)
            .await?;

        let payload = PayloadSynthesizer::new(&scope.resolver, self.options.set_params_in_body);
        let body = payload.build_body(template, method, operation, status_code).await?;
        if body.is_some() {
            let content_type =
                operation.consumes.first().map_or(DEFAULT_CONTENT_TYPE, String::as_str);
            headers
                .entry(CONTENT_TYPE_HEADER.to_string())
                .or_insert_with(|| content_type.to_string());
        }

        Ok(CaseRequest {
            method,
            path: join_base_path(&self.contract.base_path, &path),
            query,
            headers,
            body,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn param_values_render_for_urls() {
        assert_eq!(render_param_value(&json!("abc")), "abc");
        assert_eq!(render_param_value(&json!(42)), "42");
        assert_eq!(render_param_value(&json!(true)), "true");
        assert_eq!(render_param_value(&json!(["a", 1])), "a,1");
    }

    #[test]
    fn base_path_joins_without_double_slash() {
        assert_eq!(join_base_path("", "/w"), "/w");
        assert_eq!(join_base_path("/", "/w"), "/w");
        assert_eq!(join_base_path("/api/", "/w"), "/api/w");
        assert_eq!(join_base_path("/api", "/w"), "/api/w");
    }
}
