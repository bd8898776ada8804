// crates/apisanity-core/src/runtime/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Registry for parameter handlers, security handlers, and statics.
// Purpose: Route value lookups by parameter or security-scheme name.
// Dependencies: crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! The provider registry stores caller-supplied parameter and security
//! providers keyed by name, plus an optional static-value dictionary consulted
//! only when no parameter provider is registered for a name. It is populated
//! before a run and borrowed immutably by the engine for the whole run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;

use crate::interfaces::ParamProvider;
use crate::interfaces::SecurityProvider;

// ============================================================================
// SECTION: Provider Registry
// ============================================================================

/// Value provider registry.
///
/// # Invariants
/// - Names are unique per table; the last registration wins.
/// - Security providers keep first-registration order, so re-registering a
///   name replaces the handler without moving it.
/// - The static dictionary is replaced wholesale, never merged.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Parameter providers keyed by parameter name.
    params: BTreeMap<String, Box<dyn ParamProvider>>,
    /// Security providers in first-registration order.
    security: Vec<(String, Box<dyn SecurityProvider>)>,
    /// Static values used when no parameter provider matches.
    static_values: Option<Map<String, Value>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter provider under the given name.
    pub fn register_param(
        &mut self,
        name: impl Into<String>,
        provider: impl ParamProvider + 'static,
    ) {
        self.params.insert(name.into(), Box::new(provider));
    }

    /// Replaces the static-value dictionary.
    pub fn set_static_values(&mut self, values: Map<String, Value>) {
        self.static_values = Some(values);
    }

    /// Registers a security provider under the contract's scheme name.
    pub fn register_security(
        &mut self,
        name: impl Into<String>,
        provider: impl SecurityProvider + 'static,
    ) {
        let name = name.into();
        let provider: Box<dyn SecurityProvider> = Box::new(provider);
        if let Some(slot) = self.security.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = provider;
        } else {
            self.security.push((name, provider));
        }
    }

    /// Returns the parameter provider registered for `name`.
    #[must_use]
    pub fn param_provider(&self, name: &str) -> Option<&dyn ParamProvider> {
        self.params.get(name).map(AsRef::as_ref)
    }

    /// Returns the static value registered for `name`.
    #[must_use]
    pub fn static_value(&self, name: &str) -> Option<&Value> {
        self.static_values.as_ref().and_then(|values| values.get(name))
    }

    /// Returns the security provider registered for `scheme`.
    #[must_use]
    pub fn security_provider(&self, scheme: &str) -> Option<&dyn SecurityProvider> {
        self.security
            .iter()
            .find(|(name, _)| name == scheme)
            .map(|(_, provider)| provider.as_ref())
    }

    /// Returns the first-registered security provider and its name.
    #[must_use]
    pub fn first_security_provider(&self) -> Option<(&str, &dyn SecurityProvider)> {
        self.security.first().map(|(name, provider)| (name.as_str(), provider.as_ref()))
    }

    /// Returns true when at least one security provider is registered.
    #[must_use]
    pub fn has_security_providers(&self) -> bool {
        !self.security.is_empty()
    }

    /// Returns every name with a parameter provider or a static value.
    #[must_use]
    pub fn known_param_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.params.keys().map(String::as_str).collect();
        if let Some(values) = &self.static_values {
            names.extend(values.keys().map(String::as_str));
        }
        names
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
