//! # vcts-rules — VC Data Model 2.0 Assertions
//!
//! A fixed battery of normative assertions over a credential [`Document`].
//! Each assertion is a pure function returning an [`Outcome`]; none of them
//! fail. An unmet precondition (an optional field that is absent) yields
//! `skipped`, a violated statement yields `failed`.
//!
//! [`evaluate`] dispatches a [`RuleId`] to its function. The semantic
//! assertion needs an analysis result and is evaluated through
//! [`semantics::context_terms_defined`] instead.
//!
//! ## Crate Policy
//!
//! - Depends on `vcts-core` and `vcts-jsonld` only.
//! - No I/O. No panics on any JSON input.

pub mod context;
pub mod error;
pub mod rule;
pub mod semantics;
pub mod shape;
pub mod validity;

use vcts_core::{Document, Outcome};

pub use error::RuleError;
pub use rule::{RuleId, SPECIFICATION_URL};
pub use semantics::{context_terms_defined, SemanticVerdict, StepVerdict};

/// Evaluate `rule` against `document`.
///
/// [`RuleId::ContextTermsDefined`] is `skipped` here because no analysis is
/// available; callers with an analysis use [`context_terms_defined`].
pub fn evaluate(rule: RuleId, document: &Document) -> Outcome {
    let outcome = match rule {
        RuleId::ContextPresent => context::context_present(document),
        RuleId::ContextUnderstood => context::context_understood(document),
        RuleId::ContextBaseUrl => context::context_base_url(document),
        RuleId::ContextItemsValid => context::context_items_valid(document),
        RuleId::ContextTermsDefined => context_terms_defined(document, None).outcome,
        RuleId::IdShapeValid => shape::id_shape_valid(document),
        RuleId::TypePresent => shape::type_present(document),
        RuleId::TypeShapeValid => shape::type_shape_valid(document),
        RuleId::TypeIncludesBase => shape::type_includes_base(document),
        RuleId::IssuerPresent => shape::issuer_present(document),
        RuleId::IssuerShapeValid => shape::issuer_shape_valid(document),
        RuleId::CredentialSubjectPresent => shape::credential_subject_present(document),
        RuleId::ValidFromShape => validity::valid_from_shape(document),
        RuleId::ValidUntilShape => validity::valid_until_shape(document),
        RuleId::ValidFromBeforeUntil => validity::valid_from_before_until(document),
        RuleId::ValidUntilAfterFrom => validity::valid_until_after_from(document),
    };
    tracing::trace!(rule = rule.as_str(), outcome = %outcome, "rule evaluated");
    outcome
}
