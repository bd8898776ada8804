// crates/apisanity-core/src/core/case.rs
// ============================================================================
// Module: API Sanity Test Cases
// Description: Planned cases, dispatched requests, and run tallies.
// Purpose: Carry per-case data between planner, engine, and transport.
// Dependencies: crate::core::contract, serde, serde_json
// ============================================================================

//! ## Overview
//! Test cases are ephemeral: they are planned, executed, and discarded. The
//! request/response types are the wire-neutral shapes exchanged with a
//! [`crate::interfaces::Transport`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::contract::HttpMethod;
use crate::core::contract::ResponseSpec;

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// One concrete (method, path, expected status) combination.
///
/// # Invariants
/// - `status_code` is a declared response key, or the configured default
///   success code when none survive planning.
/// - `response` is an owned copy; rewriting it never touches the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// HTTP method under test.
    pub method: HttpMethod,
    /// Endpoint path template.
    pub path_template: String,
    /// Expected response status code.
    pub status_code: u16,
    /// Declared response for the expected status, if any.
    pub response: Option<ResponseSpec>,
}

impl TestCase {
    /// Returns the response schema to validate against, if declared.
    #[must_use]
    pub fn response_schema(&self) -> Option<&Value> {
        self.response.as_ref().and_then(|response| response.schema.as_ref())
    }
}

/// Planned case annotated with its skip decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCase {
    /// Planned test case.
    pub case: TestCase,
    /// True when the operation is on the disable list.
    pub skipped: bool,
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Request built for a single test case.
///
/// # Invariants
/// - `path` is the base path joined with the resolved template.
/// - `query` preserves parameter declaration order; repeated keys are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path including the base path.
    pub path: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// JSON request body, if any.
    pub body: Option<Value>,
}

/// Response observed for a single test case.
///
/// # Invariants
/// - `body` is parsed JSON when possible, a JSON string for other text, and
///   `Value::Null` for an empty body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResponse {
    /// Observed status code.
    pub status: u16,
    /// Observed response body.
    pub body: Value,
}

// ============================================================================
// SECTION: Tally
// ============================================================================

/// Pass/fail accumulator for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    /// Number of failed cases.
    pub fails: u64,
    /// Number of passed cases.
    pub passes: u64,
}

impl RunTally {
    /// Records a passed case.
    pub const fn record_pass(&mut self) {
        self.passes = self.passes.saturating_add(1);
    }

    /// Records a failed case.
    pub const fn record_fail(&mut self) {
        self.fails = self.fails.saturating_add(1);
    }

    /// Returns the number of evaluated cases.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.fails.saturating_add(self.passes)
    }
}

// ============================================================================
// SECTION: Case Failures
// ============================================================================

/// Reason a dispatched or attempted case was counted as failed.
///
/// # Invariants
/// - Variants are stable for reporting and programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseFailure {
    /// Observed status differs from the expected status.
    #[error("expected status {expected}, got {actual}")]
    StatusMismatch {
        /// Expected status code.
        expected: u16,
        /// Observed status code.
        actual: u16,
    },
    /// Response body failed schema validation.
    #[error("response schema violation: {message}")]
    SchemaViolation {
        /// First validation error, or a generic message.
        message: String,
    },
    /// Request could not be delivered or answered.
    #[error("transport failure: {message}")]
    Transport {
        /// Transport error description.
        message: String,
    },
    /// A parameter or security provider returned an error.
    #[error("provider failure: {message}")]
    Provider {
        /// Provider error description.
        message: String,
    },
    /// A provider produced a value the engine cannot use.
    #[error("configuration error: {message}")]
    Configuration {
        /// Configuration error description.
        message: String,
    },
    /// Fake data could not be generated for a schema.
    #[error("fake data generation failed: {message}")]
    Generator {
        /// Generator error description.
        message: String,
    },
    /// The response schema could not be compiled or evaluated.
    #[error("schema validator failure: {message}")]
    Validator {
        /// Validator error description.
        message: String,
    },
}
