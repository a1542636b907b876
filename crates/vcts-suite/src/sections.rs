//! The fixed layout of the conformance report: which clauses are reported,
//! in which order, and which rules each one runs.
//!
//! Clauses without automatable rules are still reported, as empty
//! sub-suites, so every run covers the whole recommendation.

use vcts_rules::{RuleId, SPECIFICATION_URL};

/// One clause of the recommendation, reported as a sub-suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Sub-suite name.
    pub name: &'static str,
    /// Fragment of the clause in the recommendation.
    pub anchor: &'static str,
    /// Top-level document keys attached to every test as `$.<key>`.
    pub fields: &'static [&'static str],
    /// Rules evaluated, in order.
    pub rules: &'static [RuleId],
}

impl Section {
    /// URL of the clause.
    pub fn link(&self) -> String {
        format!("{SPECIFICATION_URL}#{}", self.anchor)
    }
}

/// A group of clauses, reported as a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteLayout {
    pub name: &'static str,
    pub sections: &'static [Section],
}

/// Name of the report root.
pub const PARENT_SUITE: &str = "Verifiable Credentials Data Model v2.0";

const fn clause(
    name: &'static str,
    anchor: &'static str,
    fields: &'static [&'static str],
    rules: &'static [RuleId],
) -> Section {
    Section {
        name,
        anchor,
        fields,
        rules,
    }
}

/// Core data model clauses.
pub const BASIC_CONCEPTS: SuiteLayout = SuiteLayout {
    name: "Basic Concepts",
    sections: &[
        clause(
            "Contexts",
            "contexts",
            &["@context"],
            &[
                RuleId::ContextPresent,
                RuleId::ContextUnderstood,
                RuleId::ContextBaseUrl,
                RuleId::ContextItemsValid,
                RuleId::ContextTermsDefined,
            ],
        ),
        clause("Identifiers", "identifiers", &["id"], &[RuleId::IdShapeValid]),
        clause(
            "Types",
            "types",
            &["type"],
            &[
                RuleId::TypePresent,
                RuleId::TypeShapeValid,
                RuleId::TypeIncludesBase,
            ],
        ),
        clause(
            "Names and Descriptions",
            "names-and-descriptions",
            &["name", "description"],
            &[],
        ),
        clause(
            "Issuer",
            "issuer",
            &["issuer"],
            &[RuleId::IssuerPresent, RuleId::IssuerShapeValid],
        ),
        clause(
            "Credential Subject",
            "credential-subject",
            &["credentialSubject"],
            &[RuleId::CredentialSubjectPresent],
        ),
        clause(
            "Validity Period",
            "validity-period",
            &["validFrom", "validUntil"],
            &[
                RuleId::ValidFromShape,
                RuleId::ValidUntilShape,
                RuleId::ValidFromBeforeUntil,
                RuleId::ValidUntilAfterFrom,
            ],
        ),
        clause("Status", "status", &["credentialStatus"], &[]),
        clause("Data Schemas", "data-schemas", &["credentialSchema"], &[]),
        clause("Securing Mechanisms", "securing-mechanisms", &[], &[]),
        clause("Verifiable Presentations", "verifiable-presentations", &[], &[]),
    ],
};

/// Clauses beyond the core model. None has automatable rules yet.
pub const ADVANCED_CONCEPTS: SuiteLayout = SuiteLayout {
    name: "Advanced Concepts",
    sections: &[
        clause("Trust Model", "trust-model", &[], &[]),
        clause("Extensibility", "extensibility", &[], &[]),
        clause(
            "Integrity of Related Resources",
            "integrity-of-related-resources",
            &["relatedResource"],
            &[],
        ),
        clause("Refreshing", "refreshing", &["refreshService"], &[]),
        clause("Terms of Use", "terms-of-use", &["termsOfUse"], &[]),
        clause("Evidence", "evidence", &["evidence"], &[]),
        clause("Zero-Knowledge Proofs", "zero-knowledge-proofs", &[], &[]),
        clause("Representing Time", "representing-time", &[], &[]),
        clause("Authorization", "authorization", &[], &[]),
        clause("Reserved Extension Points", "reserved-extension-points", &[], &[]),
        clause("Ecosystem Compatibility", "ecosystem-compatibility", &[], &[]),
        clause("Verifiable Credential Graphs", "verifiable-credential-graphs", &[], &[]),
        clause(
            "Securing Mechanism Specifications",
            "securing-mechanism-specifications",
            &[],
            &[],
        ),
    ],
};

/// Suites in report order.
pub const SUITES: [SuiteLayout; 2] = [BASIC_CONCEPTS, ADVANCED_CONCEPTS];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_rule_is_reported_exactly_once() {
        let reported: Vec<RuleId> = SUITES
            .iter()
            .flat_map(|s| s.sections.iter())
            .flat_map(|s| s.rules.iter().copied())
            .collect();
        assert_eq!(reported.len(), RuleId::all().len());
        assert_eq!(
            reported.iter().collect::<HashSet<_>>(),
            RuleId::all().iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn rules_sit_under_their_own_clause() {
        for section in SUITES.iter().flat_map(|s| s.sections.iter()) {
            for rule in section.rules {
                assert_eq!(rule.anchor(), section.anchor, "{rule}");
            }
        }
    }

    #[test]
    fn section_counts_and_names_are_unique() {
        assert_eq!(BASIC_CONCEPTS.sections.len(), 11);
        assert_eq!(ADVANCED_CONCEPTS.sections.len(), 13);
        let names: HashSet<_> = SUITES
            .iter()
            .flat_map(|s| s.sections.iter())
            .map(|s| s.name)
            .collect();
        assert_eq!(names.len(), 24);
    }

    #[test]
    fn links_point_into_the_recommendation() {
        assert_eq!(
            BASIC_CONCEPTS.sections[0].link(),
            "https://www.w3.org/TR/vc-data-model-2.0/#contexts"
        );
    }
}
