//! Report nodes: a tagged [`NodeKind`] stored in an arena and addressed by
//! [`NodeId`].
//!
//! | Kind          | Parent        | Status                               |
//! |---------------|---------------|--------------------------------------|
//! | `ParentSuite` | none (root)   | meet of suites                       |
//! | `Suite`       | `ParentSuite` | meet of sub-suites                   |
//! | `SubSuite`    | `Suite`       | meet of tests                        |
//! | `Test`        | `SubSuite`    | explicit, or meet of its steps       |
//! | `Step`        | `Test`        | explicit                             |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use vcts_core::{content_uuid, CanonicalBytes, EpochMicros, Outcome};

/// Level of a node in the five-level report hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The report root.
    ParentSuite,
    /// A top-level section of the data model.
    Suite,
    /// A clause within a section.
    SubSuite,
    /// One normative statement.
    Test,
    /// One sub-check within a test.
    Step,
}

impl NodeKind {
    /// All kinds, coarsest first.
    pub fn all() -> &'static [NodeKind] {
        &[
            Self::ParentSuite,
            Self::Suite,
            Self::SubSuite,
            Self::Test,
            Self::Step,
        ]
    }

    /// The camelCase label, as used in Allure `labels`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentSuite => "parentSuite",
            Self::Suite => "suite",
            Self::SubSuite => "subSuite",
            Self::Test => "test",
            Self::Step => "step",
        }
    }

    /// The kind a node of this kind must be registered under.
    pub fn parent(&self) -> Option<NodeKind> {
        match self {
            Self::ParentSuite => None,
            Self::Suite => Some(Self::ParentSuite),
            Self::SubSuite => Some(Self::Suite),
            Self::Test => Some(Self::SubSuite),
            Self::Step => Some(Self::Test),
        }
    }

    /// Containers derive their status from their children.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::ParentSuite | Self::Suite | Self::SubSuite)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node in a report arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named reference to an external resource, usually the normative
/// clause being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

impl Link {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// MIME type of every attachment the engine produces.
pub const JSON_MIME: &str = "application/json";

/// A JSON payload attached to a node.
///
/// `source` is the file name the payload is exported under. It is derived
/// from the canonical form of the payload, so identical payloads share a
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub source: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(skip)]
    pub payload: Value,
}

impl Attachment {
    /// Attach `payload` under the display name `name`.
    pub fn json(name: impl Into<String>, payload: Value) -> Self {
        let id = match CanonicalBytes::new(&payload) {
            Ok(bytes) => content_uuid(&bytes),
            Err(err) => {
                tracing::warn!(error = %err, "attachment payload not canonicalizable, using random name");
                Uuid::new_v4()
            }
        };
        Self {
            name: name.into(),
            source: format!("{id}-attachment.json"),
            content_type: JSON_MIME.to_string(),
            payload,
        }
    }

    /// The payload as the bytes written to `source`.
    pub fn body(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.payload).unwrap_or_default()
    }
}

/// One node of the report tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportNode {
    pub id: NodeId,
    pub uuid: Uuid,
    pub kind: NodeKind,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub start: EpochMicros,
    pub stop: EpochMicros,
    pub status: Outcome,
    pub links: Vec<Link>,
    pub attachments: Vec<Attachment>,
}

impl ReportNode {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        name: String,
        parent: Option<NodeId>,
        at: EpochMicros,
    ) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4(),
            kind,
            name,
            parent,
            children: Vec::new(),
            start: at,
            stop: at,
            status: Outcome::Unknown,
            links: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parent_chain_reaches_root() {
        let mut depth = 0;
        let mut kind = NodeKind::Step;
        while let Some(parent) = kind.parent() {
            kind = parent;
            depth += 1;
        }
        assert_eq!(kind, NodeKind::ParentSuite);
        assert_eq!(depth, NodeKind::all().len() - 1);
    }

    #[test]
    fn only_suites_are_containers() {
        let containers: Vec<_> = NodeKind::all().iter().filter(|k| k.is_container()).collect();
        assert_eq!(containers.len(), 3);
        assert!(!NodeKind::Test.is_container());
    }

    #[test]
    fn attachment_source_is_content_addressed() {
        let a = Attachment::json("Document", json!({"b": 1, "a": 2}));
        let b = Attachment::json("Other name", json!({"a": 2, "b": 1}));
        let c = Attachment::json("Document", json!({"a": 3}));
        assert_eq!(a.source, b.source);
        assert_ne!(a.source, c.source);
        assert!(a.source.ends_with("-attachment.json"));
        assert_eq!(a.content_type, JSON_MIME);
    }

    #[test]
    fn attachment_serializes_without_payload() {
        let a = Attachment::json("$.issuer", json!("did:example:1"));
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["type"], JSON_MIME);
        assert!(v.get("payload").is_none());
        assert_eq!(a.body(), b"\"did:example:1\"");
    }
}
