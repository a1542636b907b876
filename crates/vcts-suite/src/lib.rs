//! # vcts-suite — Evaluation Orchestrator
//!
//! Runs the VC Data Model 2.0 rule set over one credential and builds the
//! conformance report. This is the only crate with a public evaluation
//! entry point; the HTTP and command-line front ends call into it.
//!
//! ## Flow
//!
//! document → semantic analysis (optional) → rule set → report builder →
//! [`Completed`] (report + `{subSuiteName: [{statement, outcome}]}` summary).
//!
//! The report layout is fixed by [`sections`]: the parent suite
//! "Verifiable Credentials Data Model v2.0", then "Basic Concepts" and
//! "Advanced Concepts", each clause a sub-suite linked to the
//! recommendation.
//!
//! ## Crate Policy
//!
//! - Each evaluation is sequential; the only state shared between
//!   evaluations is the context cache inside a [`SemanticProcessor`].
//! - Reporter state is owned by the evaluation value, never global.
//!
//! [`SemanticProcessor`]: vcts_jsonld::SemanticProcessor

pub mod config;
pub mod error;
pub mod evaluation;
pub mod sections;

pub use config::{ConfigError, Settings};
pub use error::EvaluationError;
pub use evaluation::{
    evaluate, Completed, Evaluation, EvaluationState, Idle, Running, DEFAULT_PROJECT,
};
pub use sections::{Section, SuiteLayout, PARENT_SUITE, SUITES};
