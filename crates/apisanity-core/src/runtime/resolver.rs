// crates/apisanity-core/src/runtime/resolver.rs
// ============================================================================
// Module: Parameter Resolver
// Description: Provider-first value resolution with negative-value synthesis.
// Purpose: Produce the value sent for one named parameter of one test case.
// Dependencies: crate::{interfaces, runtime::registry}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The resolver applies a fixed precedence for every parameter: a registered
//! provider, then the static dictionary, then (for `400` cases with a known
//! declared type) a deliberately wrong-typed fake value. Anything else is
//! absent and the caller omits the parameter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::interfaces::FakeGenerator;
use crate::interfaces::ParamContext;
use crate::interfaces::ProviderError;
use crate::runtime::registry::ProviderRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status code whose cases receive type-inverted values.
pub const NEGATIVE_STATUS_CODE: u16 = 400;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Parameter resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A registered provider returned an error.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The fake-data generator could not produce an inverted value.
    #[error("failed to synthesize value for {key}: {message}")]
    Synthesis {
        /// Parameter name.
        key: String,
        /// Generator error description.
        message: String,
    },
}

// ============================================================================
// SECTION: Type Inversion
// ============================================================================

/// Returns the mismatched schema type used for negative cases.
///
/// `string` maps to `integer`; every other declared type maps to `string`.
#[must_use]
pub fn inverted_type(declared: &str) -> &'static str {
    if declared == "string" { "integer" } else { "string" }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves parameter values for a single run.
pub struct ParamResolver<'a> {
    /// Registered providers and static values.
    registry: &'a ProviderRegistry,
    /// Generator used for type-inverted values.
    generator: &'a dyn FakeGenerator,
}

impl<'a> ParamResolver<'a> {
    /// Creates a resolver over the registry and generator.
    #[must_use]
    pub fn new(registry: &'a ProviderRegistry, generator: &'a dyn FakeGenerator) -> Self {
        Self {
            registry,
            generator,
        }
    }

    /// Returns the registry backing this resolver.
    #[must_use]
    pub const fn registry(&self) -> &'a ProviderRegistry {
        self.registry
    }

    /// Returns the generator backing this resolver.
    #[must_use]
    pub fn generator(&self) -> &'a dyn FakeGenerator {
        self.generator
    }

    /// Resolves one parameter value. `Ok(None)` means the parameter is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when a provider fails or synthesis fails.
    pub async fn resolve(&self, ctx: &ParamContext) -> Result<Option<Value>, ResolveError> {
        if let Some(provider) = self.registry.param_provider(&ctx.key) {
            return Ok(provider.provide(ctx).await?);
        }
        if let Some(value) = self.registry.static_value(&ctx.key) {
            return Ok(Some(value.clone()));
        }
        if ctx.status_code == NEGATIVE_STATUS_CODE
            && let Some(declared) = ctx.declared_type.as_deref()
        {
            let schema = json!({ "type": inverted_type(declared) });
            let value =
                self.generator.generate(&schema).map_err(|err| ResolveError::Synthesis {
                    key: ctx.key.clone(),
                    message: err.to_string(),
                })?;
            return Ok(Some(value));
        }
        Ok(None)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
