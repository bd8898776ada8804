// crates/apisanity-core/src/core/mod.rs
// ============================================================================
// Module: API Sanity Core Types
// Description: Contract model, test-case shapes, and run options.
// Purpose: Provide stable, serializable types shared by every crate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define the contract model consumed by the planner, the request
//! and response shapes exchanged with transports, and the run options.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod case;
pub mod contract;
pub mod options;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::CaseFailure;
pub use case::CaseRequest;
pub use case::CaseResponse;
pub use case::PlannedCase;
pub use case::RunTally;
pub use case::TestCase;
pub use contract::ContractSpec;
pub use contract::Endpoint;
pub use contract::HttpMethod;
pub use contract::Operation;
pub use contract::ParamLocation;
pub use contract::ParamSpec;
pub use contract::ResponseSpec;
pub use contract::SecurityRequirement;
pub use contract::UnknownMethod;
pub use contract::fill_template;
pub use contract::template_placeholders;
pub use options::DEFAULT_SUCCESS_HTTP_CODE;
pub use options::RunOptions;
pub use options::normalize_disable_key;
