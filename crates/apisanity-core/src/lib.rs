// crates/apisanity-core/src/lib.rs
// ============================================================================
// Module: API Sanity Core Library
// Description: Public API surface for the API Sanity core.
// Purpose: Expose contract types, collaborator interfaces, and the engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! API Sanity core derives test cases from an HTTP API contract and executes
//! them against a live system. It resolves dynamic values through caller
//! providers and talks to the transport, generator, validator, and log sink
//! only through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CaseLabel;
pub use interfaces::FakeGenerator;
pub use interfaces::GeneratorError;
pub use interfaces::NoopReporter;
pub use interfaces::ParamContext;
pub use interfaces::ParamFn;
pub use interfaces::ParamProvider;
pub use interfaces::ProviderError;
pub use interfaces::RunEvent;
pub use interfaces::RunReporter;
pub use interfaces::SchemaValidator;
pub use interfaces::SchemeMetadata;
pub use interfaces::SecurityContext;
pub use interfaces::SecurityFn;
pub use interfaces::SecurityProvider;
pub use interfaces::Transport;
pub use interfaces::TransportError;
pub use interfaces::ValidationReport;
pub use interfaces::ValidatorError;
pub use interfaces::param_fn;
pub use interfaces::security_fn;
pub use runtime::EngineError;
pub use runtime::ProviderRegistry;
pub use runtime::RunAbort;
pub use runtime::SanityEngine;
pub use runtime::plan_cases;
pub use runtime::require_all_properties;
