// crates/apisanity-core/src/core/options.rs
// ============================================================================
// Module: API Sanity Run Options
// Description: Engine-level options controlling planning and execution.
// Purpose: Provide a backend-agnostic view of the recognized run options.
// Dependencies: crate::core::contract, serde
// ============================================================================

//! ## Overview
//! Run options are the engine's configuration surface. Generator and validator
//! options are owned by their collaborators and never pass through here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::contract::HttpMethod;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default status code for operations without a retained declared response.
pub const DEFAULT_SUCCESS_HTTP_CODE: u16 = 200;

// ============================================================================
// SECTION: Run Options
// ============================================================================

/// Options recognized by the planner and execution engine.
///
/// # Invariants
/// - `disable` entries are stored normalized (lowercase method, raw path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Normalized `method:path` keys whose cases are skipped.
    disable: BTreeSet<String>,
    /// Apply a security provider even when the operation declares none.
    pub force_authorization_header: bool,
    /// Rewrite response schemas so every declared property is required.
    pub not_required_properties_validation: bool,
    /// Overlay resolved parameter values into generated bodies.
    pub set_params_in_body: bool,
    /// Status code planned when no declared response survives filtering.
    pub success_http_code: u16,
    /// Restrict planning to status codes below 300.
    pub success_cases: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            disable: BTreeSet::new(),
            force_authorization_header: false,
            not_required_properties_validation: false,
            set_params_in_body: false,
            success_http_code: DEFAULT_SUCCESS_HTTP_CODE,
            success_cases: false,
        }
    }
}

impl RunOptions {
    /// Replaces the disable list with the given `method:path` entries.
    #[must_use]
    pub fn with_disabled<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.disable =
            entries.into_iter().map(|entry| normalize_disable_key(entry.as_ref())).collect();
        self
    }

    /// Returns true when the operation is on the disable list.
    #[must_use]
    pub fn is_disabled(&self, method: HttpMethod, template: &str) -> bool {
        if self.disable.is_empty() {
            return false;
        }
        self.disable.contains(&format!("{}:{template}", method.as_str()))
    }

    /// Returns the normalized disable entries.
    #[must_use]
    pub const fn disabled(&self) -> &BTreeSet<String> {
        &self.disable
    }

    /// Returns the highest status code (exclusive) retained by the planner.
    #[must_use]
    pub const fn status_ceiling(&self) -> u16 {
        if self.success_cases { 300 } else { 500 }
    }
}

/// Normalizes a `method:path` entry so the method compares case-insensitively.
#[must_use]
pub fn normalize_disable_key(entry: &str) -> String {
    let trimmed = entry.trim();
    match trimmed.split_once(':') {
        Some((method, path)) => format!("{}:{path}", method.trim().to_ascii_lowercase()),
        None => trimmed.to_string(),
    }
}
