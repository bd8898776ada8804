// crates/apisanity-core/src/core/contract.rs
// ============================================================================
// Module: API Sanity Contract Model
// Description: Structured endpoint/method/parameter/response model.
// Purpose: Provide the read-only contract view consumed by the engine.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The contract model is the parsed, structurally validated view of an API
//! definition. Endpoints and operations preserve declaration order so that
//! traversal is deterministic and matches the source document.
//!
//! Invariants:
//! - Each `{name}` placeholder in a path template matches exactly one
//!   path-kind parameter of every operation on that endpoint.
//! - Response status codes are numeric; non-numeric keys are dropped by loaders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: HTTP Methods
// ============================================================================

/// HTTP methods recognized in contract operations.
///
/// # Invariants
/// - Labels are lowercase and match contract operation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// PUT request.
    Put,
    /// POST request.
    Post,
    /// DELETE request.
    Delete,
    /// OPTIONS request.
    Options,
    /// HEAD request.
    Head,
    /// PATCH request.
    Patch,
}

impl HttpMethod {
    /// All supported methods in canonical order.
    pub const ALL: [Self; 7] =
        [Self::Get, Self::Put, Self::Post, Self::Delete, Self::Options, Self::Head, Self::Patch];

    /// Returns the lowercase contract label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
        }
    }

    /// Returns the uppercase wire label for the method.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == lowered)
            .ok_or_else(|| UnknownMethod(value.to_string()))
    }
}

/// Error returned when a method label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown http method: {0}")]
pub struct UnknownMethod(pub String);

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Location of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// Path template placeholder.
    Path,
    /// Query string parameter.
    Query,
    /// Request header parameter.
    Header,
    /// Request body parameter.
    Body,
    /// Form field parameter (planned but never resolved).
    FormData,
}

impl ParamLocation {
    /// Returns the contract label for the location.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        }
    }
}

/// Declared operation parameter.
///
/// # Invariants
/// - `schema` is present only for body parameters.
/// - `param_type` is the declared primitive type when the contract states one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    pub location: ParamLocation,
    /// Declared primitive type, if any.
    pub param_type: Option<String>,
    /// Whether the contract marks the parameter as required.
    pub required: bool,
    /// Body schema (with local references already resolved).
    pub schema: Option<Value>,
}

// ============================================================================
// SECTION: Responses and Security
// ============================================================================

/// Declared response for a status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Human-readable response description.
    pub description: Option<String>,
    /// Response body schema, if declared.
    pub schema: Option<Value>,
}

/// One security scheme reference declared by an operation.
///
/// # Invariants
/// - Requirements keep the declaration order of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRequirement {
    /// Security scheme name as declared in `securityDefinitions`.
    pub scheme: String,
    /// Scopes requested for the scheme.
    pub scopes: Vec<String>,
}

// ============================================================================
// SECTION: Operations and Endpoints
// ============================================================================

/// Metadata for one method on an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// HTTP method of the operation.
    pub method: HttpMethod,
    /// Declared parameters (path-level parameters already merged).
    pub parameters: Vec<ParamSpec>,
    /// Declared responses keyed by numeric status code.
    pub responses: BTreeMap<u16, ResponseSpec>,
    /// Effective security requirements for the operation.
    pub security: Vec<SecurityRequirement>,
    /// Accepted request media types.
    pub consumes: Vec<String>,
}

impl Operation {
    /// Returns the first parameter declared in the given location.
    #[must_use]
    pub fn first_in(&self, location: ParamLocation) -> Option<&ParamSpec> {
        self.parameters.iter().find(|param| param.location == location)
    }

    /// Iterates parameters declared in the given location.
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParamSpec> {
        self.parameters.iter().filter(move |param| param.location == location)
    }
}

/// Endpoint path template with its operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Path template with `{name}` placeholders.
    pub template: String,
    /// Operations in declaration order.
    pub operations: Vec<Operation>,
}

/// Parsed, structurally validated API contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Base path prefixed to every endpoint template.
    pub base_path: String,
    /// Endpoints in declaration order.
    pub endpoints: Vec<Endpoint>,
    /// Security scheme metadata keyed by scheme name.
    pub security_definitions: BTreeMap<String, Value>,
}

/// Byte ranges of every `{name}` placeholder, braces included.
fn placeholder_spans(template: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while let Some(start) = template[offset ..].find('{').map(|index| offset + index) {
        let Some(end) = template[start ..].find('}').map(|index| start + index + 1) else {
            break;
        };
        spans.push((start, end));
        offset = end;
    }
    spans
}

/// Returns the placeholder names of a path template in order of appearance.
#[must_use]
pub fn template_placeholders(template: &str) -> Vec<&str> {
    placeholder_spans(template)
        .into_iter()
        .map(|(start, end)| &template[start + 1 .. end - 1])
        .collect()
}

/// Substitutes placeholders in one pass over the original template.
///
/// Placeholders without a value stay as `{name}`. Substituted values are never
/// rescanned.
#[must_use]
pub fn fill_template(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    for (start, end) in placeholder_spans(template) {
        out.push_str(&template[copied .. start]);
        match values.get(&template[start + 1 .. end - 1]) {
            Some(value) => out.push_str(value),
            None => out.push_str(&template[start .. end]),
        }
        copied = end;
    }
    out.push_str(&template[copied ..]);
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
