//! Structural comparison of two JSON values.
//!
//! Only the two change classes undefined-term detection needs are reported:
//! object keys present on the left but missing on the right, and values whose
//! JSON type differs. Added keys and same-type value changes are ignored.
//! Arrays are compared position by position.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One step of a path into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    /// Object key.
    Key(String),
    /// Array position.
    Index(usize),
}

/// Location of a change, rendered as `$.a[0].b`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Path segments from the root.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Last object key on the path.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            Segment::Key(k) => Some(k.as_str()),
            Segment::Index(_) => None,
        })
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// A difference between the left and right values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// The key at `path` exists on the left only.
    KeyRemoved {
        /// Location of the removed key, ending with the key itself.
        path: Path,
    },
    /// The value at `path` changed JSON type.
    TypeChanged {
        /// Location of the value.
        path: Path,
        /// Left-hand value.
        old_value: Value,
        /// Right-hand value.
        new_value: Value,
    },
}

/// Differences between `old` and `new`, in document order.
pub fn diff(old: &Value, new: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    walk(old, new, &Path::default(), &mut changes);
    changes
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn walk(old: &Value, new: &Value, path: &Path, changes: &mut Vec<Change>) {
    if !same_kind(old, new) {
        changes.push(Change::TypeChanged {
            path: path.clone(),
            old_value: old.clone(),
            new_value: new.clone(),
        });
        return;
    }
    match (old, new) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, left_value) in left {
                let child = path.child(Segment::Key(key.clone()));
                match right.get(key) {
                    Some(right_value) => walk(left_value, right_value, &child, changes),
                    None => changes.push(Change::KeyRemoved { path: child }),
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            for (i, (l, r)) in left.iter().zip(right).enumerate() {
                walk(l, r, &path.child(Segment::Index(i)), changes);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_values_have_no_changes() {
        let v = json!({"a": [1, {"b": "c"}]});
        assert!(diff(&v, &v).is_empty());
    }

    #[test]
    fn removed_keys_carry_their_path() {
        let changes = diff(
            &json!({"credentialSubject": {"id": "x", "foo": 1}}),
            &json!({"credentialSubject": {"id": "x"}}),
        );
        assert_eq!(changes.len(), 1);
        let Change::KeyRemoved { path } = &changes[0] else {
            panic!("expected removal, got {changes:?}");
        };
        assert_eq!(path.to_string(), "$.credentialSubject.foo");
        assert_eq!(path.last_key(), Some("foo"));
    }

    #[test]
    fn added_keys_and_value_changes_are_ignored() {
        let changes = diff(&json!({"a": 1}), &json!({"a": 2, "b": true}));
        assert!(changes.is_empty());
    }

    #[test]
    fn object_collapsed_to_string_is_a_type_change() {
        let changes = diff(
            &json!({"issuer": {"id": "https://example.org/i", "nickname": "x"}}),
            &json!({"issuer": "https://example.org/i"}),
        );
        assert_eq!(
            changes,
            vec![Change::TypeChanged {
                path: Path(vec![Segment::Key("issuer".into())]),
                old_value: json!({"id": "https://example.org/i", "nickname": "x"}),
                new_value: json!("https://example.org/i"),
            }]
        );
    }

    #[test]
    fn arrays_compare_by_position() {
        let changes = diff(
            &json!({"items": [{"a": 1}, {"b": 2}]}),
            &json!({"items": [{"a": 1}, {}]}),
        );
        assert_eq!(changes.len(), 1);
        assert!(matches!(&changes[0], Change::KeyRemoved { path } if path.to_string() == "$.items[1].b"));
    }
}
