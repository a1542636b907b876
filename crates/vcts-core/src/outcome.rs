//! # Assertion Outcomes
//!
//! Defines [`Outcome`], the result of one conformance assertion, together
//! with the lattice operations used to roll child results up into suites.
//!
//! ```text
//! Ordering (worst → best): Failed < Unknown < Passed < Skipped
//!
//! meet(a, b) = min(a, b)   (container status)
//! join(a, b) = max(a, b)
//! ```
//!
//! `Failed` is absorbing under `meet`. An `Unknown` child keeps its parent
//! from reading as `Passed`, and a container whose children were all skipped
//! is itself `Skipped`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result of evaluating one normative statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The document satisfies the statement.
    Passed,
    /// The document violates the statement.
    Failed,
    /// The statement's precondition did not hold (e.g. optional field absent).
    Skipped,
    /// The statement is defined but cannot be checked automatically.
    Unknown,
}

impl Outcome {
    /// Lattice ordering value. Lower is worse.
    fn ordering(self) -> u8 {
        match self {
            Self::Failed => 0,
            Self::Unknown => 1,
            Self::Passed => 2,
            Self::Skipped => 3,
        }
    }

    /// Greatest lower bound: the worse of the two outcomes.
    pub fn meet(self, other: Self) -> Self {
        if self.ordering() <= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Least upper bound: the better of the two outcomes.
    pub fn join(self, other: Self) -> Self {
        if self.ordering() >= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Aggregate a sequence of child outcomes into a container status.
    ///
    /// An empty sequence is `Unknown`: a container with nothing in it has
    /// checked nothing.
    pub fn aggregate<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        outcomes
            .into_iter()
            .reduce(Outcome::meet)
            .unwrap_or(Outcome::Unknown)
    }

    /// `Passed` when `condition` holds, `Failed` otherwise.
    pub fn from_bool(condition: bool) -> Self {
        if condition {
            Self::Passed
        } else {
            Self::Failed
        }
    }

    /// Definitive outcomes are `Passed` and `Failed`.
    pub fn is_definitive(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordering().cmp(&other.ordering())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
