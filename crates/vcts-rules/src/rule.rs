//! # Rule Identity
//!
//! [`RuleId`] names every assertion in the rule set. Each variant carries
//! the normative statement it checks and the clause of the VC Data Model
//! 2.0 that states it. Every `match` on `RuleId` is exhaustive, so adding
//! a rule forces every consumer to handle it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Base URL of the VC Data Model 2.0 recommendation.
pub const SPECIFICATION_URL: &str = "https://www.w3.org/TR/vc-data-model-2.0/";

/// Every assertion in the rule set.
///
/// | Rule | Clause |
/// |------|--------|
/// | `context-present` | Contexts |
/// | `context-understood` | Contexts |
/// | `context-base-url` | Contexts |
/// | `context-items-valid` | Contexts |
/// | `context-terms-defined` | Contexts |
/// | `id-shape-valid` | Identifiers |
/// | `type-present` | Types |
/// | `type-shape-valid` | Types |
/// | `type-includes-base` | Types |
/// | `issuer-present` | Issuer |
/// | `issuer-shape-valid` | Issuer |
/// | `credential-subject-present` | Credential Subject |
/// | `valid-from-shape` | Validity Period |
/// | `valid-until-shape` | Validity Period |
/// | `valid-from-before-until` | Validity Period |
/// | `valid-until-after-from` | Validity Period |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    /// `@context` is present.
    ContextPresent,
    /// Contexts are understood by the application. Not automatable.
    ContextUnderstood,
    /// `@context` is an ordered set starting with the v2 base context.
    ContextBaseUrl,
    /// Context entries after the first are URLs or objects.
    ContextItemsValid,
    /// Every property and type is defined by the declared contexts.
    ContextTermsDefined,
    /// `id`, when present, is a single URL.
    IdShapeValid,
    /// `type` is present with a value.
    TypePresent,
    /// Every `type` entry is a string.
    TypeShapeValid,
    /// `type` includes `VerifiableCredential`.
    TypeIncludesBase,
    /// `issuer` is present.
    IssuerPresent,
    /// `issuer` is a URL or an object whose `id` is a URL.
    IssuerShapeValid,
    /// `credentialSubject` is present.
    CredentialSubjectPresent,
    /// `validFrom`, when present, is a `dateTimeStamp`.
    ValidFromShape,
    /// `validUntil`, when present, is a `dateTimeStamp`.
    ValidUntilShape,
    /// `validFrom` is not later than `validUntil`.
    ValidFromBeforeUntil,
    /// `validUntil` is not earlier than `validFrom`.
    ValidUntilAfterFrom,
}

impl RuleId {
    /// All rules in evaluation order.
    pub fn all() -> &'static [RuleId] {
        &[
            Self::ContextPresent,
            Self::ContextUnderstood,
            Self::ContextBaseUrl,
            Self::ContextItemsValid,
            Self::ContextTermsDefined,
            Self::IdShapeValid,
            Self::TypePresent,
            Self::TypeShapeValid,
            Self::TypeIncludesBase,
            Self::IssuerPresent,
            Self::IssuerShapeValid,
            Self::CredentialSubjectPresent,
            Self::ValidFromShape,
            Self::ValidUntilShape,
            Self::ValidFromBeforeUntil,
            Self::ValidUntilAfterFrom,
        ]
    }

    /// Kebab-case identifier, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContextPresent => "context-present",
            Self::ContextUnderstood => "context-understood",
            Self::ContextBaseUrl => "context-base-url",
            Self::ContextItemsValid => "context-items-valid",
            Self::ContextTermsDefined => "context-terms-defined",
            Self::IdShapeValid => "id-shape-valid",
            Self::TypePresent => "type-present",
            Self::TypeShapeValid => "type-shape-valid",
            Self::TypeIncludesBase => "type-includes-base",
            Self::IssuerPresent => "issuer-present",
            Self::IssuerShapeValid => "issuer-shape-valid",
            Self::CredentialSubjectPresent => "credential-subject-present",
            Self::ValidFromShape => "valid-from-shape",
            Self::ValidUntilShape => "valid-until-shape",
            Self::ValidFromBeforeUntil => "valid-from-before-until",
            Self::ValidUntilAfterFrom => "valid-until-after-from",
        }
    }

    /// The normative statement, as worded in the recommendation.
    pub fn statement(&self) -> &'static str {
        match self {
            Self::ContextPresent => {
                "Verifiable credentials and verifiable presentations MUST include a @context property."
            }
            Self::ContextUnderstood => {
                "Application developers MUST understand every JSON-LD context used by their application, at least to the extent that it affects the meaning of the terms used by their application."
            }
            Self::ContextBaseUrl => {
                "The value of the @context property MUST be an ordered set where the first item is a URL with the value https://www.w3.org/ns/credentials/v2."
            }
            Self::ContextItemsValid => {
                "Subsequent items in the ordered set MUST be composed of any combination of URLs and objects, where each is processable as a JSON-LD Context."
            }
            Self::ContextTermsDefined => {
                "Every property and type used in the credential MUST be defined by one of its JSON-LD contexts."
            }
            Self::IdShapeValid => "If present, id property's value MUST be a single URL.",
            Self::TypePresent => {
                "Verifiable credentials and verifiable presentations MUST contain a type property with an associated value."
            }
            Self::TypeShapeValid => {
                "The value of the type property MUST be one or more terms and absolute URL strings."
            }
            Self::TypeIncludesBase => {
                "Verifiable credential object MUST have a type VerifiableCredential and, optionally, a more specific verifiable credential type."
            }
            Self::IssuerPresent => "A verifiable credential MUST have an issuer property.",
            Self::IssuerShapeValid => {
                "The value of the issuer property MUST be either a URL or an object containing an id property whose value is a URL."
            }
            Self::CredentialSubjectPresent => {
                "A verifiable credential MUST contain a credentialSubject property."
            }
            Self::ValidFromShape => {
                "If present, the value of the validFrom property MUST be an XML Schema dateTimeStamp string value representing the date and time the credential becomes valid."
            }
            Self::ValidUntilShape => {
                "If present, the value of the validUntil property MUST be an XML Schema dateTimeStamp string value representing the date and time the credential ceases to be valid."
            }
            Self::ValidFromBeforeUntil => {
                "If a validUntil value also exists, the validFrom value MUST express a datetime that is temporally the same or earlier than the datetime expressed by the validUntil value."
            }
            Self::ValidUntilAfterFrom => {
                "If a validFrom value also exists, the validUntil value MUST express a datetime that is temporally the same or later than the datetime expressed by the validFrom value."
            }
        }
    }

    /// Fragment of the clause stating this rule.
    pub fn anchor(&self) -> &'static str {
        match self {
            Self::ContextPresent
            | Self::ContextUnderstood
            | Self::ContextBaseUrl
            | Self::ContextItemsValid
            | Self::ContextTermsDefined => "contexts",
            Self::IdShapeValid => "identifiers",
            Self::TypePresent | Self::TypeShapeValid | Self::TypeIncludesBase => "types",
            Self::IssuerPresent | Self::IssuerShapeValid => "issuer",
            Self::CredentialSubjectPresent => "credential-subject",
            Self::ValidFromShape
            | Self::ValidUntilShape
            | Self::ValidFromBeforeUntil
            | Self::ValidUntilAfterFrom => "validity-period",
        }
    }

    /// Full URL of the clause stating this rule.
    pub fn link(&self) -> String {
        format!("{SPECIFICATION_URL}#{}", self.anchor())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| RuleError::UnknownRule(s.to_string()))
    }
}
