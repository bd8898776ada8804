// crates/apisanity-config/src/lib.rs
// ============================================================================
// Module: API Sanity Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for apisanity.toml semantics.
// Dependencies: apisanity-core, apisanity-providers, serde, toml
// ============================================================================

//! ## Overview
//! `apisanity-config` defines the configuration model for sanity runs and
//! provides strict, fail-closed loading and validation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
