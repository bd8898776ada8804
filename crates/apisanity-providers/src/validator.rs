// crates/apisanity-providers/src/validator.rs
// ============================================================================
// Module: JSON Schema Validator
// Description: jsonschema-backed response validation with compile caching.
// Purpose: Check response bodies against contract schemas.
// Dependencies: apisanity-core, jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! Response schemas are compiled once per distinct schema document and
//! reused for every later case that shares it. Errors are reported in the
//! order the validator produces them, so the engine can surface the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use apisanity_core::SchemaValidator;
use apisanity_core::ValidationReport;
use apisanity_core::ValidatorError;
use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// JSON Schema dialect used to compile response schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaDraft {
    /// Draft 4, the dialect Swagger 2.0 schemas are written in.
    #[default]
    Draft4,
    /// Draft 6.
    Draft6,
    /// Draft 7.
    Draft7,
    /// Draft 2019-09.
    Draft201909,
    /// Draft 2020-12.
    Draft202012,
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => Self::Draft4,
            SchemaDraft::Draft6 => Self::Draft6,
            SchemaDraft::Draft7 => Self::Draft7,
            SchemaDraft::Draft201909 => Self::Draft201909,
            SchemaDraft::Draft202012 => Self::Draft202012,
        }
    }
}

/// Options passed through to the schema validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Dialect used to compile schemas.
    pub draft: SchemaDraft,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Schema validator backed by the `jsonschema` crate.
///
/// # Invariants
/// - Each distinct schema document is compiled at most once.
pub struct JsonSchemaValidator {
    /// Validator options.
    options: ValidatorOptions,
    /// Compiled validators keyed by canonical schema text.
    cache: Mutex<BTreeMap<String, Arc<Validator>>>,
}

impl JsonSchemaValidator {
    /// Creates a validator with the given options.
    #[must_use]
    pub const fn new(options: ValidatorOptions) -> Self {
        Self {
            options,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the compiled validator for `schema`, compiling on first use.
    fn compiled(&self, schema: &Value) -> Result<Arc<Validator>, ValidatorError> {
        let key = serde_json::to_string(schema)
            .map_err(|err| ValidatorError::InvalidSchema(err.to_string()))?;
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ValidatorError::InvalidSchema("validator cache poisoned".to_string()))?;
        if let Some(existing) = cache.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let compiled = Arc::new(compile_schema(schema, self.options.draft)?);
        cache.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }
}

impl Default for JsonSchemaValidator {
    fn default() -> Self {
        Self::new(ValidatorOptions::default())
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<ValidationReport, ValidatorError> {
        let validator = self.compiled(schema)?;
        if validator.is_valid(instance) {
            return Ok(ValidationReport::accepted());
        }
        Ok(ValidationReport::rejected(
            validator.iter_errors(instance).map(|err| err.to_string()).collect(),
        ))
    }
}

/// Compiles a JSON schema validator for the requested dialect.
fn compile_schema(schema: &Value, draft: SchemaDraft) -> Result<Validator, ValidatorError> {
    jsonschema::options()
        .with_draft(draft.into())
        .build(schema)
        .map_err(|err| ValidatorError::InvalidSchema(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::*;

    #[test]
    fn reports_errors_for_invalid_instances() {
        let validator = JsonSchemaValidator::default();
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string"}}
        });
        assert!(validator.validate(&schema, &json!({"name": "a"})).unwrap().is_valid());
        let report = validator.validate(&schema, &json!({"name": 3})).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(!validator.validate(&schema, &json!({})).unwrap().is_valid());
    }

    #[test]
    fn compiled_schemas_are_cached() {
        let validator = JsonSchemaValidator::default();
        let schema = json!({"type": "string"});
        validator.validate(&schema, &json!("a")).unwrap();
        validator.validate(&schema, &json!("b")).unwrap();
        assert_eq!(validator.cache.lock().unwrap().len(), 1);
    }

    #[test]
    fn invalid_schema_is_reported() {
        let validator = JsonSchemaValidator::default();
        let err = validator.validate(&json!({"type": 12}), &json!(1)).unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidSchema(_)));
    }
}
