// crates/apisanity-core/src/runtime/mod.rs
// ============================================================================
// Module: API Sanity Runtime
// Description: Resolution, planning, and execution of derived test cases.
// Purpose: Turn a contract and a provider registry into a pass/fail tally.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! Runtime modules resolve parameter, body, and security values, plan test
//! cases per operation, and drive sequential execution against a transport.
//! Every entry point funnels through [`SanityEngine`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod abort;
pub mod engine;
pub mod payload;
pub mod planner;
pub mod registry;
pub mod resolver;
pub mod security;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use abort::RunAbort;
pub use engine::DEFAULT_CONTENT_TYPE;
pub use engine::EngineError;
pub use engine::SanityEngine;
pub use engine::render_param_value;
pub use payload::PayloadError;
pub use payload::PayloadSynthesizer;
pub use planner::plan_cases;
pub use planner::require_all_properties;
pub use registry::ProviderRegistry;
pub use resolver::NEGATIVE_STATUS_CODE;
pub use resolver::ParamResolver;
pub use resolver::ResolveError;
pub use resolver::inverted_type;
pub use security::AUTHORIZATION_HEADER;
pub use security::SecurityError;
pub use security::SecurityResolver;
pub use security::credential_headers;
