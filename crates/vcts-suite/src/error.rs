//! Evaluation errors.
//!
//! Rule outcomes and semantic failures are report content, not errors. An
//! [`EvaluationError`] means the engine itself misbehaved.

use thiserror::Error;
use vcts_core::CoreError;
use vcts_report::StructuralError;

#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The report tree was built out of order.
    #[error("report structure violated: {0}")]
    Structural(#[from] StructuralError),

    /// The document could not be canonicalized for its digest.
    #[error("document digest failed: {0}")]
    Digest(#[from] CoreError),
}
