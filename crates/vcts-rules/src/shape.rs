//! Presence and shape assertions for `id`, `type`, `issuer` and
//! `credentialSubject`.

use serde_json::Value;
use vcts_core::{is_absolute_uri, Document, Outcome};

/// The type every verifiable credential must carry.
pub const BASE_TYPE: &str = "VerifiableCredential";

/// `type` as a sequence: a bare value becomes a one-element sequence.
pub fn normalized_types(document: &Document) -> Vec<&Value> {
    match document.get("type") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// The issuer's identifier: the string itself, or the `id` of an object.
pub fn issuer_id(document: &Document) -> Option<&str> {
    match document.get("issuer")? {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// `id`, when present, is a string holding an absolute URI.
pub fn id_shape_valid(document: &Document) -> Outcome {
    match document.get("id") {
        None => Outcome::Skipped,
        Some(Value::String(id)) => Outcome::from_bool(is_absolute_uri(id)),
        Some(_) => Outcome::Failed,
    }
}

/// `type` exists and is not empty.
pub fn type_present(document: &Document) -> Outcome {
    Outcome::from_bool(document.has_truthy("type"))
}

/// Every `type` entry is a string.
pub fn type_shape_valid(document: &Document) -> Outcome {
    if !document.contains("type") {
        return Outcome::Skipped;
    }
    Outcome::from_bool(normalized_types(document).iter().all(|t| t.is_string()))
}

/// `type` contains `VerifiableCredential`.
pub fn type_includes_base(document: &Document) -> Outcome {
    Outcome::from_bool(
        normalized_types(document)
            .iter()
            .any(|t| t.as_str() == Some(BASE_TYPE)),
    )
}

/// `issuer` exists and is truthy.
pub fn issuer_present(document: &Document) -> Outcome {
    Outcome::from_bool(document.has_truthy("issuer"))
}

/// The issuer identifier is an absolute URI.
pub fn issuer_shape_valid(document: &Document) -> Outcome {
    if !document.contains("issuer") {
        return Outcome::Skipped;
    }
    Outcome::from_bool(issuer_id(document).is_some_and(is_absolute_uri))
}

/// `credentialSubject` exists and is truthy.
pub fn credential_subject_present(document: &Document) -> Outcome {
    Outcome::from_bool(document.has_truthy("credentialSubject"))
}
