//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the sole input accepted by the digest functions in
//! [`crate::digest`]. Its only constructor serializes through `serde_jcs`
//! (RFC 8785): sorted keys, compact separators, ECMAScript number
//! formatting. Two JSON documents that differ only in key order or
//! whitespace therefore hash to the same digest and receive the same
//! content-derived attachment name.
//!
//! Unlike the key order of the [`Document`](crate::Document) itself, which is
//! preserved for display, canonical bytes are for identity only.

use serde::Serialize;

use crate::error::CoreError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new`].
/// - Object keys are sorted by UTF-16 code units, separators are compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Canonicalization`] if the value cannot be
    /// represented as JSON (e.g. a map with non-string keys or a NaN).
    pub fn new(obj: &impl Serialize) -> Result<Self, CoreError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical form as text. JCS output is always UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z@]{1,10}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonicalization_is_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_output_parses_back_to_an_equal_value(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        #[test]
        fn key_insertion_order_does_not_matter(
            keys in prop::collection::btree_set("[a-z]{1,8}", 2..6)
        ) {
            let forward: serde_json::Map<String, Value> =
                keys.iter().map(|k| (k.clone(), Value::from(k.len()))).collect();
            let reverse: serde_json::Map<String, Value> =
                keys.iter().rev().map(|k| (k.clone(), Value::from(k.len()))).collect();
            let a = CanonicalBytes::new(&Value::Object(forward)).unwrap();
            let b = CanonicalBytes::new(&Value::Object(reverse)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
