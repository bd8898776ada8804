// crates/apisanity-contract/src/refs.rs
// ============================================================================
// Module: Local Reference Resolution
// Description: Inlining of `#/...` references within a contract document.
// Purpose: Hand the engine self-contained schemas with no `$ref` indirection.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Only document-local references are supported. A reference that re-enters a
//! definition already being inlined becomes the empty schema, which keeps
//! recursive definitions finite while still validating the outer levels.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::loader::ContractError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum reference nesting depth.
pub const MAX_REF_DEPTH: usize = 64;

/// Key marking a reference object.
const REF_KEY: &str = "$ref";

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves local references against one document.
pub struct RefResolver<'d> {
    /// Whole contract document.
    document: &'d Value,
}

impl<'d> RefResolver<'d> {
    /// Creates a resolver over a parsed document.
    #[must_use]
    pub const fn new(document: &'d Value) -> Self {
        Self {
            document,
        }
    }

    /// Returns the target of a local reference.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnresolvedReference`] for remote or dangling
    /// references.
    pub fn lookup(&self, reference: &str) -> Result<&'d Value, ContractError> {
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| ContractError::UnresolvedReference(reference.to_string()))?;
        self.document
            .pointer(pointer)
            .ok_or_else(|| ContractError::UnresolvedReference(reference.to_string()))
    }

    /// Follows a top-level reference object, if `value` is one.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when the chain is dangling or too deep.
    pub fn follow<'v>(&self, value: &'v Value) -> Result<&'v Value, ContractError>
    where
        'd: 'v,
    {
        let mut current = value;
        for _ in 0 .. MAX_REF_DEPTH {
            match current.get(REF_KEY).and_then(Value::as_str) {
                Some(reference) => current = self.lookup(reference)?,
                None => return Ok(current),
            }
        }
        Err(ContractError::Invalid("reference chain exceeds depth limit".to_string()))
    }

    /// Returns `schema` with every nested local reference inlined.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when a reference cannot be resolved.
    pub fn inline(&self, schema: &Value) -> Result<Value, ContractError> {
        self.inline_at(schema, &mut Vec::new())
    }

    /// Recursive worker for [`RefResolver::inline`].
    fn inline_at(&self, value: &Value, stack: &mut Vec<String>) -> Result<Value, ContractError> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get(REF_KEY).and_then(Value::as_str) {
                    if stack.iter().any(|open| open == reference) {
                        return Ok(Value::Object(Map::new()));
                    }
                    if stack.len() >= MAX_REF_DEPTH {
                        return Err(ContractError::Invalid(format!(
                            "reference depth exceeded at {reference}"
                        )));
                    }
                    let target = self.lookup(reference)?;
                    stack.push(reference.to_string());
                    let inlined = self.inline_at(target, stack);
                    stack.pop();
                    return inlined;
                }
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.inline_at(child, stack)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline_at(item, stack))
                .collect::<Result<_, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
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
    fn recursive_definitions_terminate() {
        let document = json!({
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {"child": {"$ref": "#/definitions/Node"}}
                }
            }
        });
        let resolver = RefResolver::new(&document);
        let inlined = resolver.inline(&json!({"$ref": "#/definitions/Node"})).unwrap();
        assert_eq!(inlined["properties"]["child"], json!({}));
    }

    #[test]
    fn remote_references_are_rejected() {
        let document = json!({});
        let resolver = RefResolver::new(&document);
        let err = resolver.inline(&json!({"$ref": "other.json#/x"})).unwrap_err();
        assert!(matches!(err, ContractError::UnresolvedReference(_)));
    }
}
