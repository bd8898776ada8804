// crates/apisanity-core/src/runtime/planner.rs
// ============================================================================
// Module: Test Case Planner
// Description: Expansion of operations into per-status test cases.
// Purpose: Decide which expected status codes are exercised for an operation.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The planner turns one operation's declared responses into an ordered list
//! of test cases. Server-error codes are never planned; success-only mode
//! narrows further to codes below 300. An operation with no surviving code
//! still yields one case at the configured default success code.
//!
//! When required-property sharpening is enabled, each case owns a rewritten
//! copy of its response schema in which every object sub-schema requires all
//! of its declared properties.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::HttpMethod;
use crate::core::ResponseSpec;
use crate::core::RunOptions;
use crate::core::TestCase;

// ============================================================================
// SECTION: Planning
// ============================================================================

/// Plans the test cases for one operation.
///
/// # Invariants
/// - Codes are visited in ascending order.
/// - The result is never empty.
#[must_use]
pub fn plan_cases(
    method: HttpMethod,
    path_template: &str,
    responses: &BTreeMap<u16, ResponseSpec>,
    options: &RunOptions,
) -> Vec<TestCase> {
    let ceiling = options.status_ceiling();
    let mut cases: Vec<TestCase> = responses
        .range(..ceiling)
        .map(|(status, response)| {
            let mut response = response.clone();
            if options.not_required_properties_validation
                && let Some(schema) = response.schema.as_mut()
            {
                require_all_properties(schema);
            }
            TestCase {
                method,
                path_template: path_template.to_string(),
                status_code: *status,
                response: Some(response),
            }
        })
        .collect();
    if cases.is_empty() {
        cases.push(TestCase {
            method,
            path_template: path_template.to_string(),
            status_code: options.success_http_code,
            response: None,
        });
    }
    cases
}

// ============================================================================
// SECTION: Required-Property Rewrite
// ============================================================================

/// Schema keywords holding a single nested schema.
const SINGLE_SCHEMA_KEYWORDS: [&str; 2] = ["additionalProperties", "not"];
/// Schema keywords holding a list of nested schemas.
const SCHEMA_LIST_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Sets `required` to the full property-name list on every object sub-schema.
///
/// Names keep their declaration order. Boolean schemas are left untouched.
pub fn require_all_properties(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };
    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        let names: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
        for child in properties.values_mut() {
            require_all_properties(child);
        }
        map.insert("required".to_string(), Value::Array(names));
    }
    match map.get_mut("items") {
        Some(Value::Array(items)) => items.iter_mut().for_each(require_all_properties),
        Some(items) => require_all_properties(items),
        None => {}
    }
    for keyword in SINGLE_SCHEMA_KEYWORDS {
        if let Some(child) = map.get_mut(keyword) {
            require_all_properties(child);
        }
    }
    for keyword in SCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = map.get_mut(keyword) {
            children.iter_mut().for_each(require_all_properties);
        }
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
    fn rewrite_reaches_nested_and_array_schemas() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "b": {"type": "string"},
                "a": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"x": {}, "y": {}}}
                }
            },
            "allOf": [{"properties": {"z": {}}}],
            "additionalProperties": false
        });
        require_all_properties(&mut schema);
        assert_eq!(schema["required"], json!(["b", "a"]));
        assert_eq!(schema["properties"]["a"]["items"]["required"], json!(["x", "y"]));
        assert_eq!(schema["allOf"][0]["required"], json!(["z"]));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn empty_responses_yield_default_case() {
        let mut options = RunOptions::default();
        options.success_http_code = 201;
        let cases = plan_cases(HttpMethod::Post, "/x", &BTreeMap::new(), &options);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].status_code, 201);
        assert!(cases[0].response.is_none());
    }
}
