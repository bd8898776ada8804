// crates/apisanity-contract/src/lib.rs
// ============================================================================
// Module: API Sanity Contract
// Description: Contract document loading for API Sanity.
// Purpose: Turn Swagger 2.0 documents into validated contract models.
// Dependencies: apisanity-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! This crate loads Swagger 2.0 contracts from JSON or YAML, inlines local
//! references, and validates path placeholders before the engine is built.
//! Invariants:
//! - Loaded contracts never contain `$ref` indirection.
//! - Endpoint and method order follows the source document.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod loader;
pub mod refs;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use loader::ContractError;
pub use loader::ContractFormat;
pub use loader::MAX_CONTRACT_FILE_SIZE;
pub use loader::load_contract;
pub use loader::parse_contract;
pub use refs::RefResolver;
