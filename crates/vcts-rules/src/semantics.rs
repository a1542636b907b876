//! The `context-terms-defined` assertion, evaluated over the result of
//! semantic analysis. Analysis itself happens upstream; this module only
//! turns its result into outcomes.

use serde::Serialize;
use serde_json::Value;
use vcts_core::{Document, Outcome};
use vcts_jsonld::{SemanticAnalysis, SemanticError};

/// One sub-check of the semantic assertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepVerdict {
    /// Step display name.
    pub name: &'static str,
    /// Step outcome.
    pub outcome: Outcome,
    /// Undefined terms found by this step.
    pub findings: Vec<String>,
}

/// Outcome of `context-terms-defined`, with its steps and any processing
/// error rendered as `{type, code, url?, details?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticVerdict {
    /// Overall outcome.
    pub outcome: Outcome,
    /// Per-detection steps. Empty when analysis did not run or failed.
    pub steps: Vec<StepVerdict>,
    /// Error object when analysis failed.
    pub error: Option<Value>,
}

impl SemanticVerdict {
    fn skipped() -> Self {
        Self {
            outcome: Outcome::Skipped,
            steps: Vec::new(),
            error: None,
        }
    }
}

/// Step name for undefined-property detection.
pub const PROPERTIES_STEP: &str = "All properties are defined by the active context.";
/// Step name for undefined-type detection.
pub const TYPES_STEP: &str = "All types are defined by the active context.";

/// Evaluate `context-terms-defined`.
///
/// Skipped without `@context` or when no analysis was performed. A failed
/// analysis fails the assertion with the error attached.
pub fn context_terms_defined(
    document: &Document,
    analysis: Option<&Result<SemanticAnalysis, SemanticError>>,
) -> SemanticVerdict {
    if !document.contains("@context") {
        return SemanticVerdict::skipped();
    }
    match analysis {
        None => SemanticVerdict::skipped(),
        Some(Err(err)) => {
            tracing::debug!(error = %err, "semantic analysis failed");
            SemanticVerdict {
                outcome: Outcome::Failed,
                steps: Vec::new(),
                error: Some(err.to_error_object()),
            }
        }
        Some(Ok(analysis)) => {
            let steps = vec![
                StepVerdict {
                    name: PROPERTIES_STEP,
                    outcome: Outcome::from_bool(analysis.undefined_properties.is_empty()),
                    findings: analysis.undefined_properties.clone(),
                },
                StepVerdict {
                    name: TYPES_STEP,
                    outcome: Outcome::from_bool(analysis.undefined_types.is_empty()),
                    findings: analysis.undefined_types.clone(),
                },
            ];
            SemanticVerdict {
                outcome: Outcome::aggregate(steps.iter().map(|s| s.outcome)),
                steps,
                error: None,
            }
        }
    }
}
