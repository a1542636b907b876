//! The rule set evaluated end to end over whole documents.

use proptest::prelude::*;
use serde_json::{json, Value};
use vcts_core::{Document, Outcome};
use vcts_rules::{evaluate, RuleId};

fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

const PRESENCE: [RuleId; 5] = [
    RuleId::ContextPresent,
    RuleId::TypePresent,
    RuleId::TypeIncludesBase,
    RuleId::IssuerPresent,
    RuleId::CredentialSubjectPresent,
];

#[test]
fn minimal_credential_passes_core_rules() {
    let d = doc(json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "type": "VerifiableCredential",
        "issuer": "https://example.org/issuers/1",
        "credentialSubject": {"id": "https://example.org/subjects/1"}
    }));
    for rule in [
        RuleId::ContextPresent,
        RuleId::ContextBaseUrl,
        RuleId::TypePresent,
        RuleId::TypeIncludesBase,
        RuleId::IssuerPresent,
        RuleId::IssuerShapeValid,
        RuleId::CredentialSubjectPresent,
    ] {
        assert_eq!(evaluate(rule, &d), Outcome::Passed, "{rule}");
    }
}

#[test]
fn empty_document_fails_presence_and_skips_conditionals() {
    let d = doc(json!({}));
    for rule in RuleId::all() {
        let outcome = evaluate(*rule, &d);
        if PRESENCE.contains(rule) {
            assert_eq!(outcome, Outcome::Failed, "{rule}");
        } else if *rule == RuleId::ContextUnderstood {
            assert_eq!(outcome, Outcome::Unknown);
        } else {
            assert_eq!(outcome, Outcome::Skipped, "{rule}");
        }
    }
}

#[test]
fn examples_context_after_base_passes() {
    let d = doc(json!({
        "@context": [
            "https://www.w3.org/ns/credentials/v2",
            "https://www.w3.org/ns/credentials/examples/v2"
        ]
    }));
    assert_eq!(evaluate(RuleId::ContextBaseUrl, &d), Outcome::Passed);
    assert_eq!(evaluate(RuleId::ContextItemsValid, &d), Outcome::Passed);
}

#[test]
fn reversed_validity_period_fails() {
    let d = doc(json!({
        "validFrom": "2024-01-01T00:00:00Z",
        "validUntil": "2023-01-01T00:00:00Z"
    }));
    assert_eq!(evaluate(RuleId::ValidFromShape, &d), Outcome::Passed);
    assert_eq!(evaluate(RuleId::ValidUntilShape, &d), Outcome::Passed);
    assert_eq!(evaluate(RuleId::ValidFromBeforeUntil, &d), Outcome::Failed);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9:/._#-]{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z@]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_credential() -> impl Strategy<Value = Value> {
    let keys = [
        "@context",
        "id",
        "type",
        "issuer",
        "credentialSubject",
        "validFrom",
        "validUntil",
    ];
    prop::collection::vec((prop::sample::select(keys.to_vec()), arb_json()), 0..7).prop_map(
        |entries| {
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            )
        },
    )
}

proptest! {
    #[test]
    fn evaluation_is_total_and_deterministic(value in arb_credential()) {
        let d = doc(value);
        for rule in RuleId::all() {
            let first = evaluate(*rule, &d);
            prop_assert_eq!(first, evaluate(*rule, &d));
        }
    }

    #[test]
    fn presence_rules_never_skip(value in arb_credential()) {
        let d = doc(value);
        for rule in PRESENCE {
            prop_assert_ne!(evaluate(rule, &d), Outcome::Skipped);
        }
    }
}
