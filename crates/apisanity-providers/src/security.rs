// crates/apisanity-providers/src/security.rs
// ============================================================================
// Module: Built-in Security Providers
// Description: Static and environment-backed credential sources.
// Purpose: Supply request credentials without caller-written handlers.
// Dependencies: apisanity-core, async-trait, serde, serde_json
// ============================================================================

//! ## Overview
//! [`StaticSecurityProvider`] returns a fixed token or header map.
//! [`EnvSecurityProvider`] reads a token from the process environment under
//! explicit allowlist and denylist rules plus hard size limits, and can be
//! pointed at an override map for deterministic lookups.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use apisanity_core::ProviderError;
use apisanity_core::SecurityContext;
use apisanity_core::SecurityProvider;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Static Provider
// ============================================================================

/// Security provider returning fixed credentials.
pub struct StaticSecurityProvider {
    /// Credentials handed to the engine.
    credentials: Value,
}

impl StaticSecurityProvider {
    /// Creates a provider whose token becomes the `Authorization` header.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            credentials: Value::String(token.into()),
        }
    }

    /// Creates a provider that sets each header in `headers`.
    #[must_use]
    pub fn headers(headers: BTreeMap<String, String>) -> Self {
        let map: Map<String, Value> =
            headers.into_iter().map(|(name, value)| (name, Value::String(value))).collect();
        Self {
            credentials: Value::Object(map),
        }
    }
}

#[async_trait]
impl SecurityProvider for StaticSecurityProvider {
    async fn credentials(&self, _ctx: &SecurityContext) -> Result<Value, ProviderError> {
        Ok(self.credentials.clone())
    }
}

// ============================================================================
// SECTION: Environment Provider
// ============================================================================

/// Configuration for the environment security provider.
///
/// # Invariants
/// - `denylist` overrides `allowlist` when both are present.
/// - `max_value_bytes` and `max_key_bytes` are enforced as hard upper bounds.
/// - `overrides` take precedence over process environment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvSecurityConfig {
    /// Environment variable holding the credential.
    pub variable: String,
    /// Text prepended to the value, such as `"Bearer "`.
    pub prefix: Option<String>,
    /// Header to set instead of `Authorization`.
    pub header: Option<String>,
    /// Optional allowlist of environment variable keys.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of environment variable keys.
    pub denylist: BTreeSet<String>,
    /// Maximum bytes allowed for the environment value.
    pub max_value_bytes: usize,
    /// Maximum bytes allowed for the environment key.
    pub max_key_bytes: usize,
    /// Optional override map used for deterministic lookups.
    pub overrides: Option<BTreeMap<String, String>>,
}

impl Default for EnvSecurityConfig {
    fn default() -> Self {
        Self {
            variable: String::new(),
            prefix: None,
            header: None,
            allowlist: None,
            denylist: BTreeSet::new(),
            max_value_bytes: 64 * 1024,
            max_key_bytes: 255,
            overrides: None,
        }
    }
}

/// Security provider reading a credential from the environment.
///
/// # Invariants
/// - Applies allowlist/denylist policy before any lookup.
/// - A missing variable fails the case rather than sending no credentials.
pub struct EnvSecurityProvider {
    /// Provider configuration, including policy and size limits.
    config: EnvSecurityConfig,
}

impl EnvSecurityProvider {
    /// Creates a new environment security provider.
    #[must_use]
    pub const fn new(config: EnvSecurityConfig) -> Self {
        Self {
            config,
        }
    }

    /// Reads the configured variable, applying policy and limits.
    fn read_value(&self) -> Result<String, ProviderError> {
        let key = self.config.variable.as_str();
        if key.is_empty() {
            return Err(ProviderError::Failed("env variable name is empty".to_string()));
        }
        if key.len() > self.config.max_key_bytes {
            return Err(ProviderError::Failed("env key exceeds limit".to_string()));
        }
        if !is_key_allowed(&self.config, key) {
            return Err(ProviderError::Failed("env key blocked by policy".to_string()));
        }
        let value = match &self.config.overrides {
            Some(overrides) => overrides.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        let value = value.ok_or_else(|| ProviderError::Failed(format!("env key {key} is unset")))?;
        if value.len() > self.config.max_value_bytes {
            return Err(ProviderError::Failed("env value exceeds limit".to_string()));
        }
        Ok(value)
    }
}

#[async_trait]
impl SecurityProvider for EnvSecurityProvider {
    async fn credentials(&self, _ctx: &SecurityContext) -> Result<Value, ProviderError> {
        let value = self.read_value()?;
        let credential = match &self.config.prefix {
            Some(prefix) => format!("{prefix}{value}"),
            None => value,
        };
        Ok(match &self.config.header {
            Some(header) => {
                let mut map = Map::new();
                map.insert(header.clone(), Value::String(credential));
                Value::Object(map)
            }
            None => Value::String(credential),
        })
    }
}

/// Validates the key against allowlist/denylist policy.
fn is_key_allowed(config: &EnvSecurityConfig, key: &str) -> bool {
    if config.denylist.contains(key) {
        return false;
    }
    if let Some(allowlist) = &config.allowlist {
        return allowlist.contains(key);
    }
    true
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

    use apisanity_core::HttpMethod;
    use serde_json::json;

    use super::*;

    fn ctx() -> SecurityContext {
        SecurityContext {
            scheme: None,
            path: "/widgets/{id}".to_string(),
            method: HttpMethod::Get,
            status_code: 200,
        }
    }

    fn env_config(overrides: &[(&str, &str)]) -> EnvSecurityConfig {
        EnvSecurityConfig {
            variable: "API_TOKEN".to_string(),
            overrides: Some(
                overrides.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            ),
            ..EnvSecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn static_headers_are_returned_verbatim() {
        let mut headers = BTreeMap::new();
        headers.insert("X-Api-Key".to_string(), "k1".to_string());
        let provider = StaticSecurityProvider::headers(headers);
        assert_eq!(provider.credentials(&ctx()).await.unwrap(), json!({"X-Api-Key": "k1"}));
    }

    #[tokio::test]
    async fn env_value_gets_prefix_and_header() {
        let mut config = env_config(&[("API_TOKEN", "abc")]);
        config.prefix = Some("Bearer ".to_string());
        let provider = EnvSecurityProvider::new(config.clone());
        assert_eq!(provider.credentials(&ctx()).await.unwrap(), json!("Bearer abc"));
        config.header = Some("X-Token".to_string());
        let provider = EnvSecurityProvider::new(config);
        assert_eq!(provider.credentials(&ctx()).await.unwrap(), json!({"X-Token": "Bearer abc"}));
    }

    #[tokio::test]
    async fn env_policy_and_limits_fail_closed() {
        let mut config = env_config(&[("API_TOKEN", "abcdef")]);
        config.denylist.insert("API_TOKEN".to_string());
        let denied = EnvSecurityProvider::new(config).credentials(&ctx()).await;
        assert!(matches!(denied, Err(ProviderError::Failed(_))));

        let mut config = env_config(&[("API_TOKEN", "abcdef")]);
        config.max_value_bytes = 3;
        let oversized = EnvSecurityProvider::new(config).credentials(&ctx()).await;
        assert!(matches!(oversized, Err(ProviderError::Failed(_))));

        let missing = EnvSecurityProvider::new(env_config(&[])).credentials(&ctx()).await;
        assert!(matches!(missing, Err(ProviderError::Failed(_))));
    }
}
