// crates/apisanity-core/src/runtime/payload.rs
// ============================================================================
// Module: Payload Synthesizer
// Description: Fake request bodies with deep parameter overlay.
// Purpose: Build the JSON body sent for one test case.
// Dependencies: crate::{core, interfaces, runtime::resolver}, serde_json
// ============================================================================

//! ## Overview
//! The synthesizer fakes a body from the operation's `body` parameter schema.
//! When overlay is enabled, every object key in the generated value whose name
//! has a registered provider or static value is re-resolved and overwritten,
//! at any depth. Names that never occur in the body are never resolved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::HttpMethod;
use crate::core::Operation;
use crate::core::ParamLocation;
use crate::interfaces::ParamContext;
use crate::runtime::resolver::ParamResolver;
use crate::runtime::resolver::ResolveError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Body synthesis errors.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body schema could not be faked.
    #[error("failed to generate body: {0}")]
    Generator(String),
    /// Overlay resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

// ============================================================================
// SECTION: Location Paths
// ============================================================================

/// One step from a value to a nested child.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Object member by key.
    Key(String),
    /// Array element by index.
    Index(usize),
}

/// Collects the paths of every object member named `name`.
///
/// A matched member's value is not searched further.
fn collect_matches(
    value: &Value,
    name: &str,
    prefix: &mut Vec<Segment>,
    out: &mut Vec<Vec<Segment>>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(Segment::Key(key.clone()));
                if key == name {
                    out.push(prefix.clone());
                } else {
                    collect_matches(child, name, prefix, out);
                }
                prefix.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                prefix.push(Segment::Index(index));
                collect_matches(child, name, prefix, out);
                prefix.pop();
            }
        }
        _ => {}
    }
}

/// Writes `replacement` at `path`, removing the member when it is `None`.
fn apply_at(root: &mut Value, path: &[Segment], replacement: Option<Value>) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut cursor = root;
    for segment in parents {
        let next = match segment {
            Segment::Key(key) => cursor.get_mut(key.as_str()),
            Segment::Index(index) => cursor.get_mut(*index),
        };
        let Some(next) = next else {
            return;
        };
        cursor = next;
    }
    let (Segment::Key(key), Value::Object(map)) = (last, cursor) else {
        return;
    };
    match replacement {
        Some(value) => {
            map.insert(key.clone(), value);
        }
        None => {
            map.remove(key);
        }
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Builds request bodies for test cases.
pub struct PayloadSynthesizer<'r, 'a> {
    /// Resolver used for overlay values.
    resolver: &'r ParamResolver<'a>,
    /// Overlay resolved parameter values into the generated body.
    set_params_in_body: bool,
}

impl<'r, 'a> PayloadSynthesizer<'r, 'a> {
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new(resolver: &'r ParamResolver<'a>, set_params_in_body: bool) -> Self {
        Self {
            resolver,
            set_params_in_body,
        }
    }

    /// Builds the body for an operation, or `None` when it declares no body.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when generation or overlay resolution fails.
    pub async fn build_body(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &Operation,
        status_code: u16,
    ) -> Result<Option<Value>, PayloadError> {
        let Some(param) = operation.first_in(ParamLocation::Body) else {
            return Ok(None);
        };
        let empty = json!({});
        let schema = param.schema.as_ref().unwrap_or(&empty);
        let mut body = self
            .resolver
            .generator()
            .generate(schema)
            .map_err(|err| PayloadError::Generator(err.to_string()))?;
        if self.set_params_in_body {
            self.overlay(&mut body, path, method, status_code).await?;
        }
        Ok(Some(body))
    }

    /// Overwrites every member whose key is a known parameter name.
    ///
    /// Locations come from the generated value before any overwrite, so
    /// resolved values are never searched. Outer locations are applied first
    /// and anything beneath a replaced location is left alone.
    async fn overlay(
        &self,
        body: &mut Value,
        path: &str,
        method: HttpMethod,
        status_code: u16,
    ) -> Result<(), ResolveError> {
        let mut located: Vec<(String, Vec<Segment>)> = Vec::new();
        for name in self.resolver.registry().known_param_names() {
            let mut matches = Vec::new();
            collect_matches(body, name, &mut Vec::new(), &mut matches);
            located.extend(matches.into_iter().map(|location| (name.to_string(), location)));
        }
        located.sort_by_key(|(_, location)| location.len());
        let mut replaced: Vec<Vec<Segment>> = Vec::new();
        for (name, location) in located {
            if replaced.iter().any(|outer| location.starts_with(outer)) {
                continue;
            }
            let ctx = ParamContext {
                key: name,
                location: ParamLocation::Body,
                declared_type: None,
                status_code,
                path: path.to_string(),
                method,
            };
            let value = self.resolver.resolve(&ctx).await?;
            apply_at(body, &location, value);
            replaced.push(location);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
