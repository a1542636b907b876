//! # Error Types
//!
//! Errors raised by the core primitives. Rule evaluation never surfaces these
//! to callers; rules translate them into `failed` or `skipped` outcomes.

use thiserror::Error;

/// Error type for `vcts-core` constructors and parsers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The value handed to [`Document`](crate::Document) was not a JSON object.
    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A string did not match the XML Schema `dateTimeStamp` lexical form,
    /// or named a calendar date that does not exist.
    #[error("invalid dateTimeStamp {value:?}: {reason}")]
    InvalidDateTime {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Canonical serialization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] serde_json::Error),
}
