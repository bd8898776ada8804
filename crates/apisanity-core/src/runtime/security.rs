// crates/apisanity-core/src/runtime/security.rs
// ============================================================================
// Module: Security Resolver
// Description: Security scheme selection and credential header mapping.
// Purpose: Add credential headers to the request for one test case.
// Dependencies: crate::{core, interfaces, runtime::registry}, serde_json
// ============================================================================

//! ## Overview
//! The security resolver picks the first declared scheme that has a registered
//! provider, calls it, and maps the result into headers. A string result sets
//! `Authorization`; an object result sets one header per member. Any other
//! shape is rejected so malformed headers never reach the transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::core::HttpMethod;
use crate::core::SecurityRequirement;
use crate::interfaces::ProviderError;
use crate::interfaces::SchemeMetadata;
use crate::interfaces::SecurityContext;
use crate::interfaces::SecurityProvider;
use crate::runtime::registry::ProviderRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header set by string credential results.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Security resolution errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The provider returned an error.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The provider returned a value that cannot become headers.
    #[error("security provider {provider} returned unsupported {found}")]
    UnsupportedResult {
        /// Name the provider is registered under.
        provider: String,
        /// Description of the rejected shape.
        found: String,
    },
}

// ============================================================================
// SECTION: Result Mapping
// ============================================================================

/// Returns a short name for a JSON value's shape.
const fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Maps a credential result into header entries.
///
/// # Errors
///
/// Returns [`SecurityError::UnsupportedResult`] for any shape other than a
/// string or an object of scalar members.
pub fn credential_headers(
    provider: &str,
    credentials: Value,
) -> Result<Vec<(String, String)>, SecurityError> {
    match credentials {
        Value::String(token) => Ok(vec![(AUTHORIZATION_HEADER.to_string(), token)]),
        Value::Object(members) => {
            let mut headers = Vec::with_capacity(members.len());
            for (name, value) in members {
                let rendered = match value {
                    Value::String(text) => text,
                    Value::Bool(flag) => flag.to_string(),
                    Value::Number(number) => number.to_string(),
                    other => {
                        return Err(SecurityError::UnsupportedResult {
                            provider: provider.to_string(),
                            found: format!("{} value for header {name}", shape_name(&other)),
                        });
                    }
                };
                headers.push((name, rendered));
            }
            Ok(headers)
        }
        other => Err(SecurityError::UnsupportedResult {
            provider: provider.to_string(),
            found: shape_name(&other).to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves credential headers for test cases.
pub struct SecurityResolver<'a> {
    /// Registered security providers.
    registry: &'a ProviderRegistry,
    /// Scheme definitions from the contract.
    definitions: &'a BTreeMap<String, Value>,
    /// Apply the first provider when the operation declares no security.
    force_authorization_header: bool,
}

impl<'a> SecurityResolver<'a> {
    /// Creates a security resolver.
    #[must_use]
    pub const fn new(
        registry: &'a ProviderRegistry,
        definitions: &'a BTreeMap<String, Value>,
        force_authorization_header: bool,
    ) -> Self {
        Self {
            registry,
            definitions,
            force_authorization_header,
        }
    }

    /// Adds credential headers for the operation to `headers`.
    ///
    /// Headers are left unchanged when no provider applies.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError`] when the provider fails or returns an
    /// unsupported shape.
    pub async fn resolve_headers(
        &self,
        requirements: &[SecurityRequirement],
        path: &str,
        method: HttpMethod,
        status_code: u16,
        headers: &mut BTreeMap<String, String>,
    ) -> Result<(), SecurityError> {
        let Some((provider_name, provider, scheme)) = self.select(requirements) else {
            return Ok(());
        };
        let ctx = SecurityContext {
            scheme,
            path: path.to_string(),
            method,
            status_code,
        };
        let credentials = provider.credentials(&ctx).await?;
        headers.extend(credential_headers(&provider_name, credentials)?);
        Ok(())
    }

    /// Picks the provider and scheme metadata for the operation.
    fn select(
        &self,
        requirements: &[SecurityRequirement],
    ) -> Option<(String, &'a dyn SecurityProvider, Option<SchemeMetadata>)> {
        if !self.registry.has_security_providers() {
            return None;
        }
        if requirements.is_empty() {
            if !self.force_authorization_header {
                return None;
            }
            let (name, provider) = self.registry.first_security_provider()?;
            return Some((name.to_string(), provider, None));
        }
        requirements.iter().find_map(|requirement| {
            let provider = self.registry.security_provider(&requirement.scheme)?;
            let scheme = SchemeMetadata {
                name: requirement.scheme.clone(),
                scopes: requirement.scopes.clone(),
                definition: self.definitions.get(&requirement.scheme).cloned(),
            };
            Some((requirement.scheme.clone(), provider, Some(scheme)))
        })
    }
}
