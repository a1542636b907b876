//! Validity period assertions.
//!
//! Shape checks are lexical. The ordering checks resolve both stamps to
//! UTC instants; a stamp that cannot be resolved fails the ordering check
//! because no ordering can be established.

use serde_json::Value;
use vcts_core::{DateTimeStamp, Document, Outcome};

fn stamp_shape(document: &Document, key: &str) -> Outcome {
    match document.get(key) {
        None => Outcome::Skipped,
        Some(Value::String(s)) => Outcome::from_bool(DateTimeStamp::is_lexically_valid(s)),
        Some(_) => Outcome::Failed,
    }
}

fn parse_stamp(value: &Value) -> Option<DateTimeStamp> {
    value.as_str().and_then(|s| DateTimeStamp::parse(s).ok())
}

fn compare(document: &Document, ordered: impl Fn(&DateTimeStamp, &DateTimeStamp) -> bool) -> Outcome {
    let (Some(from), Some(until)) = (document.get("validFrom"), document.get("validUntil")) else {
        return Outcome::Skipped;
    };
    match (parse_stamp(from), parse_stamp(until)) {
        (Some(from), Some(until)) => Outcome::from_bool(ordered(&from, &until)),
        _ => {
            tracing::debug!("validity period bound is not a resolvable dateTimeStamp");
            Outcome::Failed
        }
    }
}

/// `validFrom`, when present, is a `dateTimeStamp` string.
pub fn valid_from_shape(document: &Document) -> Outcome {
    stamp_shape(document, "validFrom")
}

/// `validUntil`, when present, is a `dateTimeStamp` string.
pub fn valid_until_shape(document: &Document) -> Outcome {
    stamp_shape(document, "validUntil")
}

/// `validFrom` ≤ `validUntil` when both are present.
pub fn valid_from_before_until(document: &Document) -> Outcome {
    compare(document, |from, until| from <= until)
}

/// `validUntil` ≥ `validFrom` when both are present.
pub fn valid_until_after_from(document: &Document) -> Outcome {
    compare(document, |from, until| until >= from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn shapes_are_skipped_when_absent() {
        let d = doc(json!({}));
        assert_eq!(valid_from_shape(&d), Outcome::Skipped);
        assert_eq!(valid_until_shape(&d), Outcome::Skipped);
        assert_eq!(valid_from_before_until(&d), Outcome::Skipped);
        assert_eq!(valid_until_after_from(&d), Outcome::Skipped);
    }

    #[test]
    fn shapes_require_timezone() {
        let d = doc(json!({
            "validFrom": "2024-01-01T00:00:00Z",
            "validUntil": "2025-01-01T00:00:00"
        }));
        assert_eq!(valid_from_shape(&d), Outcome::Passed);
        assert_eq!(valid_until_shape(&d), Outcome::Failed);
    }

    #[test]
    fn non_string_stamps_fail() {
        let d = doc(json!({"validFrom": 1704067200}));
        assert_eq!(valid_from_shape(&d), Outcome::Failed);
    }

    #[test]
    fn reversed_period_fails_both_orderings() {
        let d = doc(json!({
            "validFrom": "2024-01-01T00:00:00Z",
            "validUntil": "2023-01-01T00:00:00Z"
        }));
        assert_eq!(valid_from_before_until(&d), Outcome::Failed);
        assert_eq!(valid_until_after_from(&d), Outcome::Failed);
    }

    #[test]
    fn ordering_uses_instants_across_offsets() {
        let d = doc(json!({
            "validFrom": "2024-01-01T10:00:00+02:00",
            "validUntil": "2024-01-01T08:00:00Z"
        }));
        assert_eq!(valid_from_before_until(&d), Outcome::Passed);
        assert_eq!(valid_until_after_from(&d), Outcome::Passed);
    }

    #[test]
    fn unresolvable_bound_fails_ordering() {
        let d = doc(json!({
            "validFrom": "yesterday",
            "validUntil": "2024-01-01T00:00:00Z"
        }));
        assert_eq!(valid_from_before_until(&d), Outcome::Failed);
    }
}
