//! Errors for the rule set's lookup surface. Rule evaluation itself never
//! fails; exceptional inputs become `failed` or `skipped` outcomes.

use thiserror::Error;

/// Error type for `vcts-rules`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A rule identifier string did not name any rule.
    #[error("unknown rule identifier: {0:?}")]
    UnknownRule(String),
}
