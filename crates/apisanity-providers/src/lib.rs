// crates/apisanity-providers/src/lib.rs
// ============================================================================
// Module: API Sanity Providers
// Description: Built-in collaborators for the sanity engine.
// Purpose: Ship a live HTTP transport, fake data, validation, and reporting.
// Dependencies: apisanity-core, jsonschema, rand, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! This crate ships the default implementations of the engine's collaborator
//! traits: a reqwest-backed [`HttpTransport`], a seeded
//! [`RandomFakeGenerator`], a caching [`JsonSchemaValidator`], console and
//! JSON-lines reporters, and static or environment-backed security providers.
//! Invariants:
//! - Network reads are bounded by timeouts and response size limits.
//! - Reporters never fail a run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod faker;
pub mod reporter;
pub mod security;
pub mod transport;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use faker::GeneratorOptions;
pub use faker::RandomFakeGenerator;
pub use reporter::ConsoleReporter;
pub use reporter::JsonLinesReporter;
pub use security::EnvSecurityConfig;
pub use security::EnvSecurityProvider;
pub use security::StaticSecurityProvider;
pub use transport::HttpTransport;
pub use transport::HttpTransportConfig;
pub use validator::JsonSchemaValidator;
pub use validator::SchemaDraft;
pub use validator::ValidatorOptions;
