// crates/apisanity-config/src/config.rs
// ============================================================================
// Module: API Sanity Configuration
// Description: Configuration loading and validation for sanity runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: apisanity-core, apisanity-providers, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file names the contract, the target, run options, the options passed
//! through to the generator and validator, static parameter values, and the
//! built-in security providers to register. Invalid configuration fails
//! before any case is planned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use apisanity_core::RunOptions;
use apisanity_providers::EnvSecurityConfig;
use apisanity_providers::GeneratorOptions;
use apisanity_providers::HttpTransportConfig;
use apisanity_providers::ValidatorOptions;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "apisanity.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "APISANITY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum response size limit in bytes.
const MAX_RESPONSE_LIMIT: usize = 64 * 1024 * 1024;
/// Maximum number of disable-list entries.
const MAX_DISABLE_ENTRIES: usize = 4_096;
/// Maximum number of configured security providers.
const MAX_SECURITY_PROVIDERS: usize = 64;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level `apisanity.toml` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SanityConfig {
    /// Contract location.
    #[serde(default)]
    pub contract: ContractConfig,
    /// Target transport settings.
    #[serde(default)]
    pub target: HttpTransportConfig,
    /// Run options.
    #[serde(default)]
    pub run: RunConfig,
    /// Options passed through to the fake data generator.
    #[serde(default)]
    pub generator: GeneratorOptions,
    /// Options passed through to the schema validator.
    #[serde(default)]
    pub validator: ValidatorOptions,
    /// Static parameter values keyed by parameter name.
    #[serde(default)]
    pub static_values: Option<Map<String, Value>>,
    /// Built-in security providers keyed by scheme.
    #[serde(default)]
    pub security: Vec<SecurityConfig>,
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Directory of the loaded config file (not serialized).
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

/// Contract location settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Path to the contract document, relative to the config file.
    pub path: Option<String>,
}

/// Run option settings.
///
/// # Invariants
/// - `disable` entries use the `method:path` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Cases to skip, as `method:path` entries.
    pub disable: Vec<String>,
    /// Apply a security provider even when an operation declares none.
    pub force_authorization_header: bool,
    /// Require every declared response property during validation.
    pub not_required_properties_validation: bool,
    /// Overlay resolved parameter values into generated bodies.
    pub set_params_in_body: bool,
    /// Status planned when no declared response survives filtering.
    pub success_http_code: u16,
    /// Restrict planning to status codes below 300.
    pub success_cases: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let defaults = RunOptions::default();
        Self {
            disable: Vec::new(),
            force_authorization_header: defaults.force_authorization_header,
            not_required_properties_validation: defaults.not_required_properties_validation,
            set_params_in_body: defaults.set_params_in_body,
            success_http_code: defaults.success_http_code,
            success_cases: defaults.success_cases,
        }
    }
}

/// Built-in security provider registered under a contract scheme name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Contract security scheme name.
    pub scheme: String,
    /// Credential source.
    pub provider: SecuritySourceConfig,
}

/// Credential source for a configured security provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecuritySourceConfig {
    /// Fixed token or header map.
    Static {
        /// Token sent as the `Authorization` header.
        #[serde(default)]
        token: Option<String>,
        /// Headers sent verbatim.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    /// Token read from the environment.
    Env(EnvSecurityConfig),
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Console,
    /// One JSON record per event.
    JsonLines,
}

/// Report output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Output format.
    pub format: ReportFormat,
    /// Color console markers.
    pub color: bool,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SanityConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then `APISANITY_CONFIG`, then
    /// `apisanity.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        let mut config = Self::parse(&bytes)?;
        config.source_dir = resolved.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses and validates configuration from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.contract.path else {
            return Err(ConfigError::Invalid("contract.path is required".to_string()));
        };
        validate_path_string("contract.path", path)?;
        validate_target(&self.target)?;
        self.run.validate()?;
        validate_generator(&self.generator)?;
        let mut schemes = BTreeSet::new();
        if self.security.len() > MAX_SECURITY_PROVIDERS {
            return Err(ConfigError::Invalid("too many security providers".to_string()));
        }
        for entry in &self.security {
            entry.validate()?;
            if !schemes.insert(entry.scheme.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate security scheme: {}",
                    entry.scheme
                )));
            }
        }
        Ok(())
    }

    /// Returns the contract path, resolved against the config directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no contract path is configured.
    pub fn contract_path(&self) -> Result<PathBuf, ConfigError> {
        let raw = self
            .contract
            .path
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("contract.path is required".to_string()))?;
        let path = Path::new(raw.trim());
        Ok(match &self.source_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        })
    }

    /// Builds engine run options from the `[run]` section.
    #[must_use]
    pub fn to_run_options(&self) -> RunOptions {
        let mut options = RunOptions::default().with_disabled(&self.run.disable);
        options.force_authorization_header = self.run.force_authorization_header;
        options.not_required_properties_validation = self.run.not_required_properties_validation;
        options.set_params_in_body = self.run.set_params_in_body;
        options.success_http_code = self.run.success_http_code;
        options.success_cases = self.run.success_cases;
        options
    }
}

impl RunConfig {
    /// Validates run options.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(100 ..= 599).contains(&self.success_http_code) {
            return Err(ConfigError::Invalid(
                "run.success_http_code must be between 100 and 599".to_string(),
            ));
        }
        if self.disable.len() > MAX_DISABLE_ENTRIES {
            return Err(ConfigError::Invalid("run.disable has too many entries".to_string()));
        }
        for entry in &self.disable {
            let valid = entry
                .split_once(':')
                .is_some_and(|(method, path)| !method.trim().is_empty() && path.starts_with('/'));
            if !valid {
                return Err(ConfigError::Invalid(format!(
                    "run.disable entry must look like method:/path: {entry}"
                )));
            }
        }
        Ok(())
    }
}

impl SecurityConfig {
    /// Validates one security provider entry.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme.trim().is_empty() {
            return Err(ConfigError::Invalid("security.scheme must be non-empty".to_string()));
        }
        match &self.provider {
            SecuritySourceConfig::Static {
                token,
                headers,
            } => match (token, headers.is_empty()) {
                (Some(_), false) => Err(ConfigError::Invalid(format!(
                    "security {} sets both token and headers",
                    self.scheme
                ))),
                (None, true) => Err(ConfigError::Invalid(format!(
                    "security {} needs a token or headers",
                    self.scheme
                ))),
                _ => Ok(()),
            },
            SecuritySourceConfig::Env(env) => {
                if env.variable.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "security {} needs an env variable",
                        self.scheme
                    )));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the target transport settings.
fn validate_target(target: &HttpTransportConfig) -> Result<(), ConfigError> {
    let base = target.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::Invalid(
            "target.base_url must start with http:// or https://".to_string(),
        ));
    }
    if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&target.timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "target.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )));
    }
    if target.max_response_bytes == 0 || target.max_response_bytes > MAX_RESPONSE_LIMIT {
        return Err(ConfigError::Invalid(
            "target.max_response_bytes is out of range".to_string(),
        ));
    }
    if target.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("target.user_agent must be non-empty".to_string()));
    }
    Ok(())
}

/// Validates generator pass-through options.
fn validate_generator(options: &GeneratorOptions) -> Result<(), ConfigError> {
    if options.min_items > options.max_items {
        return Err(ConfigError::Invalid(
            "generator.min_items must not exceed generator.max_items".to_string(),
        ));
    }
    if options.max_depth == 0 {
        return Err(ConfigError::Invalid("generator.max_depth must be at least 1".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
