// crates/apisanity-contract/src/loader.rs
// ============================================================================
// Module: Contract Loader
// Description: Swagger 2.0 document loading and structural validation.
// Purpose: Produce a validated ContractSpec from a JSON or YAML document.
// Dependencies: apisanity-core, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! The loader reads a size-limited contract file, parses it as JSON or YAML,
//! and lowers it into [`ContractSpec`]. Path-level parameters are merged into
//! each operation, local references are inlined, and global `security` and
//! `consumes` apply where an operation does not override them.
//!
//! Every `{name}` placeholder must match exactly one path parameter on every
//! operation of its endpoint, otherwise the contract is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use apisanity_core::ContractSpec;
use apisanity_core::Endpoint;
use apisanity_core::HttpMethod;
use apisanity_core::Operation;
use apisanity_core::ParamLocation;
use apisanity_core::ParamSpec;
use apisanity_core::ResponseSpec;
use apisanity_core::SecurityRequirement;
use apisanity_core::template_placeholders;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::refs::RefResolver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum contract file size in bytes.
pub const MAX_CONTRACT_FILE_SIZE: usize = 16 * 1024 * 1024;

/// Supported contract version.
const SWAGGER_VERSION: &str = "2.0";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Contract loading errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The contract file could not be read.
    #[error("contract io error: {0}")]
    Io(String),
    /// The contract document is not valid JSON or YAML.
    #[error("contract parse error: {0}")]
    Parse(String),
    /// The document is not a Swagger 2.0 contract.
    #[error("unsupported contract version: {0}")]
    UnsupportedVersion(String),
    /// A `$ref` could not be resolved locally.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    /// The contract violates a structural rule.
    #[error("invalid contract: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Contract document encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ContractFormat {
    /// Picks the format from a file extension; anything but YAML is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Json,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a contract file.
///
/// # Errors
///
/// Returns [`ContractError`] when the file cannot be read, parsed, or lowered.
pub fn load_contract(path: &Path) -> Result<ContractSpec, ContractError> {
    let bytes = read_file_limited(path, MAX_CONTRACT_FILE_SIZE)?;
    parse_contract(&bytes, ContractFormat::from_path(path))
}

/// Parses and validates contract bytes.
///
/// # Errors
///
/// Returns [`ContractError`] when the document is malformed or invalid.
pub fn parse_contract(bytes: &[u8], format: ContractFormat) -> Result<ContractSpec, ContractError> {
    let document: Value = match format {
        ContractFormat::Json => {
            serde_json::from_slice(bytes).map_err(|err| ContractError::Parse(err.to_string()))?
        }
        ContractFormat::Yaml => {
            serde_yaml::from_slice(bytes).map_err(|err| ContractError::Parse(err.to_string()))?
        }
    };
    lower_document(&document)
}

/// Reads a file while enforcing a maximum byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ContractError> {
    let file = File::open(path).map_err(|err| ContractError::Io(err.to_string()))?;
    let limit = u64::try_from(max_bytes.saturating_add(1))
        .map_err(|_| ContractError::Io("contract size limit exceeds u64".to_string()))?;
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf).map_err(|err| ContractError::Io(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(ContractError::Io("contract file exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Lowering
// ============================================================================

/// Lowers a parsed document into the contract model.
fn lower_document(document: &Value) -> Result<ContractSpec, ContractError> {
    let root = document
        .as_object()
        .ok_or_else(|| ContractError::Invalid("document root must be an object".to_string()))?;
    // Unquoted YAML `swagger: 2.0` parses as a number.
    let version = match root.get("swagger") {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => version.to_string(),
        _ => return Err(ContractError::UnsupportedVersion("missing swagger field".to_string())),
    };
    if version != SWAGGER_VERSION {
        return Err(ContractError::UnsupportedVersion(version));
    }
    let refs = RefResolver::new(document);
    let global_security = match root.get("security") {
        Some(value) => lower_security(value)?,
        None => Vec::new(),
    };
    let global_consumes = string_list(root.get("consumes"));
    let security_definitions: BTreeMap<String, Value> = root
        .get("securityDefinitions")
        .and_then(Value::as_object)
        .map(|defs| defs.iter().map(|(name, def)| (name.clone(), def.clone())).collect())
        .unwrap_or_default();

    let mut endpoints = Vec::new();
    if let Some(paths) = root.get("paths") {
        let paths = paths
            .as_object()
            .ok_or_else(|| ContractError::Invalid("paths must be an object".to_string()))?;
        for (template, item) in paths {
            if template.starts_with("x-") {
                continue;
            }
            let item = refs.follow(item)?;
            let endpoint =
                lower_path_item(&refs, template, item, &global_security, &global_consumes)?;
            endpoints.push(endpoint);
        }
    }

    Ok(ContractSpec {
        base_path: root.get("basePath").and_then(Value::as_str).unwrap_or_default().to_string(),
        endpoints,
        security_definitions,
    })
}

/// Lowers one path item into an endpoint.
fn lower_path_item(
    refs: &RefResolver<'_>,
    template: &str,
    item: &Value,
    global_security: &[SecurityRequirement],
    global_consumes: &[String],
) -> Result<Endpoint, ContractError> {
    let item = item
        .as_object()
        .ok_or_else(|| ContractError::Invalid(format!("path item {template} must be an object")))?;
    let shared = match item.get("parameters") {
        Some(params) => lower_parameters(refs, template, params)?,
        None => Vec::new(),
    };
    let mut operations = Vec::new();
    for (key, op) in item {
        if key == "parameters" || key.starts_with("x-") {
            continue;
        }
        let method: HttpMethod = key
            .parse()
            .map_err(|err| ContractError::Invalid(format!("path {template}: {err}")))?;
        let op = op.as_object().ok_or_else(|| {
            ContractError::Invalid(format!("operation {key} {template} must be an object"))
        })?;
        let own = match op.get("parameters") {
            Some(params) => lower_parameters(refs, template, params)?,
            None => Vec::new(),
        };
        let operation = Operation {
            method,
            parameters: merge_parameters(&shared, own),
            responses: lower_responses(refs, template, op.get("responses"))?,
            security: match op.get("security") {
                Some(value) => lower_security(value)?,
                None => global_security.to_vec(),
            },
            consumes: match op.get("consumes") {
                Some(value) => string_list(Some(value)),
                None => global_consumes.to_vec(),
            },
        };
        check_placeholders(template, &operation)?;
        operations.push(operation);
    }
    Ok(Endpoint {
        template: template.to_string(),
        operations,
    })
}

/// Merges path-level parameters with operation parameters.
///
/// Operation parameters override shared ones with the same name and location.
fn merge_parameters(shared: &[ParamSpec], own: Vec<ParamSpec>) -> Vec<ParamSpec> {
    let mut merged: Vec<ParamSpec> = shared
        .iter()
        .filter(|param| {
            !own.iter().any(|other| other.name == param.name && other.location == param.location)
        })
        .cloned()
        .collect();
    merged.extend(own);
    merged
}

/// Lowers a parameter list.
fn lower_parameters(
    refs: &RefResolver<'_>,
    template: &str,
    params: &Value,
) -> Result<Vec<ParamSpec>, ContractError> {
    let params = params
        .as_array()
        .ok_or_else(|| ContractError::Invalid(format!("parameters of {template} must be a list")))?;
    params.iter().map(|param| lower_parameter(refs, template, param)).collect()
}

/// Lowers one parameter object.
fn lower_parameter(
    refs: &RefResolver<'_>,
    template: &str,
    param: &Value,
) -> Result<ParamSpec, ContractError> {
    let param = refs.follow(param)?;
    let name = param
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ContractError::Invalid(format!("parameter without name in {template}")))?;
    let location = match param.get("in").and_then(Value::as_str) {
        Some("path") => ParamLocation::Path,
        Some("query") => ParamLocation::Query,
        Some("header") => ParamLocation::Header,
        Some("body") => ParamLocation::Body,
        Some("formData") => ParamLocation::FormData,
        other => {
            return Err(ContractError::Invalid(format!(
                "parameter {name} in {template} has unsupported location {}",
                other.unwrap_or("<missing>")
            )));
        }
    };
    let schema = match (location, param.get("schema")) {
        (ParamLocation::Body, Some(schema)) => Some(refs.inline(schema)?),
        _ => None,
    };
    Ok(ParamSpec {
        name: name.to_string(),
        location,
        param_type: param.get("type").and_then(Value::as_str).map(str::to_string),
        required: location == ParamLocation::Path
            || param.get("required").and_then(Value::as_bool).unwrap_or(false),
        schema,
    })
}

/// Lowers the responses object, skipping `default` and extensions.
fn lower_responses(
    refs: &RefResolver<'_>,
    template: &str,
    responses: Option<&Value>,
) -> Result<BTreeMap<u16, ResponseSpec>, ContractError> {
    let Some(responses) = responses else {
        return Ok(BTreeMap::new());
    };
    let responses = responses
        .as_object()
        .ok_or_else(|| ContractError::Invalid(format!("responses of {template} must be a map")))?;
    let mut out = BTreeMap::new();
    for (code, response) in responses {
        if code == "default" || code.starts_with("x-") {
            continue;
        }
        let status: u16 = code.parse().map_err(|_| {
            ContractError::Invalid(format!("response key {code} in {template} is not numeric"))
        })?;
        let response = refs.follow(response)?;
        let schema = match response.get("schema") {
            Some(schema) => Some(refs.inline(schema)?),
            None => None,
        };
        out.insert(status, ResponseSpec {
            description: response.get("description").and_then(Value::as_str).map(str::to_string),
            schema,
        });
    }
    Ok(out)
}

/// Flattens a security requirement list in declaration order.
fn lower_security(value: &Value) -> Result<Vec<SecurityRequirement>, ContractError> {
    let entries = value
        .as_array()
        .ok_or_else(|| ContractError::Invalid("security must be a list".to_string()))?;
    let mut requirements = Vec::new();
    for entry in entries {
        let entry: &Map<String, Value> = entry.as_object().ok_or_else(|| {
            ContractError::Invalid("security requirement must be an object".to_string())
        })?;
        for (scheme, scopes) in entry {
            requirements.push(SecurityRequirement {
                scheme: scheme.clone(),
                scopes: string_list(Some(scopes)),
            });
        }
    }
    Ok(requirements)
}

/// Collects the string members of an optional list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Checks that every placeholder has exactly one path parameter.
fn check_placeholders(template: &str, operation: &Operation) -> Result<(), ContractError> {
    for placeholder in template_placeholders(template) {
        let count = operation
            .params_in(ParamLocation::Path)
            .filter(|param| param.name == placeholder)
            .count();
        if count != 1 {
            return Err(ContractError::Invalid(format!(
                "placeholder {{{placeholder}}} in {} {template} matches {count} path parameters",
                operation.method.as_str()
            )));
        }
    }
    Ok(())
}
