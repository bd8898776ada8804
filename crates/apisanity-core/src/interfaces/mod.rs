// crates/apisanity-core/src/interfaces/mod.rs
// ============================================================================
// Module: API Sanity Interfaces
// Description: Backend-agnostic interfaces for providers and collaborators.
// Purpose: Define the contract surfaces used by the API Sanity runtime.
// Dependencies: crate::core, async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the engine integrates with value providers, the HTTP
//! transport, the fake-data generator, the response validator, and the log
//! sink without embedding backend-specific details.
//!
//! Every provider is invoked through one asynchronous contract. Providers that
//! never suspend still return a future, so the engine has a single call path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::CaseFailure;
use crate::core::CaseRequest;
use crate::core::CaseResponse;
use crate::core::HttpMethod;
use crate::core::ParamLocation;
use crate::core::RunTally;

// ============================================================================
// SECTION: Provider Contexts
// ============================================================================

/// Context passed to every parameter provider call.
///
/// # Invariants
/// - `declared_type` is `None` for body-overlay resolution.
/// - `path` is the endpoint path template, not the resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamContext {
    /// Parameter name being resolved.
    pub key: String,
    /// Where the resolved value will be placed.
    pub location: ParamLocation,
    /// Declared contract type, when known.
    pub declared_type: Option<String>,
    /// Status code of the case under test.
    pub status_code: u16,
    /// Endpoint path template.
    pub path: String,
    /// HTTP method of the case under test.
    pub method: HttpMethod,
}

/// Security scheme metadata passed to security providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeMetadata {
    /// Scheme name as declared by the contract.
    pub name: String,
    /// Scopes requested by the operation.
    pub scopes: Vec<String>,
    /// Scheme definition from `securityDefinitions`, if present.
    pub definition: Option<Value>,
}

/// Context passed to every security provider call.
///
/// # Invariants
/// - `scheme` is `None` only when the operation declares no security and the
///   engine forces an authorization header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityContext {
    /// Matched scheme metadata, if the operation declares security.
    pub scheme: Option<SchemeMetadata>,
    /// Endpoint path template.
    pub path: String,
    /// HTTP method of the case under test.
    pub method: HttpMethod,
    /// Status code of the case under test.
    pub status_code: u16,
}

// ============================================================================
// SECTION: Value Providers
// ============================================================================

/// Errors returned by parameter and security providers.
///
/// # Invariants
/// - `Failed` is isolated to the current case.
/// - `Defect` aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider could not produce a value for this case.
    #[error("provider failed: {0}")]
    Failed(String),
    /// Provider hit an unexpected defect; the run must stop.
    #[error("provider defect: {0}")]
    Defect(String),
}

/// Caller-supplied parameter value source.
#[async_trait]
pub trait ParamProvider: Send + Sync {
    /// Resolves a value for the parameter described by `ctx`.
    ///
    /// Returning `Ok(None)` omits the parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the value cannot be produced.
    async fn provide(&self, ctx: &ParamContext) -> Result<Option<Value>, ProviderError>;
}

/// Caller-supplied security credential source.
#[async_trait]
pub trait SecurityProvider: Send + Sync {
    /// Resolves credentials for the security context.
    ///
    /// A string maps to the `Authorization` header; an object maps each key
    /// to a header. Any other shape is rejected by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when credentials cannot be produced.
    async fn credentials(&self, ctx: &SecurityContext) -> Result<Value, ProviderError>;
}

/// Parameter provider backed by an async closure.
pub struct ParamFn<F> {
    /// Wrapped closure.
    handler: F,
}

/// Wraps an async closure as a [`ParamProvider`].
pub const fn param_fn<F, Fut>(handler: F) -> ParamFn<F>
where
    F: Fn(ParamContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ProviderError>> + Send + 'static,
{
    ParamFn {
        handler,
    }
}

#[async_trait]
impl<F, Fut> ParamProvider for ParamFn<F>
where
    F: Fn(ParamContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ProviderError>> + Send + 'static,
{
    async fn provide(&self, ctx: &ParamContext) -> Result<Option<Value>, ProviderError> {
        (self.handler)(ctx.clone()).await
    }
}

/// Security provider backed by an async closure.
pub struct SecurityFn<F> {
    /// Wrapped closure.
    handler: F,
}

/// Wraps an async closure as a [`SecurityProvider`].
pub const fn security_fn<F, Fut>(handler: F) -> SecurityFn<F>
where
    F: Fn(SecurityContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ProviderError>> + Send + 'static,
{
    SecurityFn {
        handler,
    }
}

#[async_trait]
impl<F, Fut> SecurityProvider for SecurityFn<F>
where
    F: Fn(SecurityContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ProviderError>> + Send + 'static,
{
    async fn credentials(&self, ctx: &SecurityContext) -> Result<Value, ProviderError> {
        (self.handler)(ctx.clone()).await
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport errors for request dispatch.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be built from the case.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Request failed in flight or the response could not be read.
    #[error("request failed: {0}")]
    Failed(String),
}

/// HTTP-capable handle to the system under test.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the observed response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request cannot be completed.
    async fn send(&self, request: &CaseRequest) -> Result<CaseResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &CaseRequest) -> Result<CaseResponse, TransportError> {
        (**self).send(request).await
    }
}

// ============================================================================
// SECTION: Fake Data Generator
// ============================================================================

/// Fake data generation errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Schema uses a construct the generator cannot satisfy.
    #[error("unsupported schema: {0}")]
    Unsupported(String),
    /// Generator internal state is unusable.
    #[error("generator failure: {0}")]
    Internal(String),
}

/// Produces fake instances of JSON schemas.
pub trait FakeGenerator: Send + Sync {
    /// Generates a value conforming to `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when no value can be produced.
    fn generate(&self, schema: &Value) -> Result<Value, GeneratorError>;
}

impl<G: FakeGenerator + ?Sized> FakeGenerator for Arc<G> {
    fn generate(&self, schema: &Value) -> Result<Value, GeneratorError> {
        (**self).generate(schema)
    }
}

// ============================================================================
// SECTION: Schema Validator
// ============================================================================

/// Result of validating an instance against a schema.
///
/// # Invariants
/// - A rejected report may carry no messages; validity is never inferred from
///   `errors` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when the instance satisfies the schema.
    pub valid: bool,
    /// Validation error messages in evaluation order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Builds a report for an instance that satisfies the schema.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Builds a report for a rejected instance.
    #[must_use]
    pub const fn rejected(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Returns true when the instance satisfies the schema.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Schema validator errors.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Schema could not be compiled.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Validates response bodies against JSON schemas.
pub trait SchemaValidator: Send + Sync {
    /// Validates `instance` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError`] when the schema cannot be compiled.
    fn validate(&self, schema: &Value, instance: &Value)
    -> Result<ValidationReport, ValidatorError>;
}

impl<V: SchemaValidator + ?Sized> SchemaValidator for Arc<V> {
    fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<ValidationReport, ValidatorError> {
        (**self).validate(schema, instance)
    }
}

// ============================================================================
// SECTION: Run Reporter
// ============================================================================

/// Case identity attached to reporter events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseLabel {
    /// HTTP method under test.
    pub method: HttpMethod,
    /// Endpoint path template.
    pub path: String,
    /// Expected status code.
    pub status_code: u16,
}

/// Event emitted to the log sink during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Case skipped by the disable list.
    CaseSkipped {
        /// Skipped case.
        case: CaseLabel,
    },
    /// Case passed.
    CasePassed {
        /// Passed case.
        case: CaseLabel,
    },
    /// Case failed.
    CaseFailed {
        /// Failed case.
        case: CaseLabel,
        /// Failure reason.
        failure: CaseFailure,
    },
    /// Run stopped early.
    RunAborted {
        /// Abort reason.
        reason: String,
        /// Tally at the time of the abort.
        tally: RunTally,
    },
    /// Run completed.
    RunSummary {
        /// Final tally.
        tally: RunTally,
    },
}

/// Log sink for run events.
///
/// Reporting is a side channel; implementations must not fail the run.
pub trait RunReporter: Send + Sync {
    /// Records an event.
    fn record(&self, event: &RunEvent);
}

impl<R: RunReporter + ?Sized> RunReporter for Arc<R> {
    fn record(&self, event: &RunEvent) {
        (**self).record(event);
    }
}

/// No-op reporter.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct NoopReporter;

impl RunReporter for NoopReporter {
    fn record(&self, _event: &RunEvent) {}
}
