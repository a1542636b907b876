//! The finished, immutable report and its flattened summary.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use vcts_core::Outcome;

use crate::node::{NodeId, NodeKind, ReportNode};

/// Labels carried by a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Reporting project the report belongs to.
    pub project: String,
    /// SHA-256 of the canonical JSON of the evaluated document.
    pub document_digest: Option<String>,
}

impl ReportMeta {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            document_digest: None,
        }
    }

    pub fn with_document_digest(mut self, digest: impl Into<String>) -> Self {
        self.document_digest = Some(digest.into());
        self
    }
}

/// One test as it appears in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub statement: String,
    pub outcome: Outcome,
}

/// Tests of one sub-suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSuiteSummary {
    pub name: String,
    pub entries: Vec<SummaryEntry>,
}

/// The report flattened to `{subSuiteName: [{statement, outcome}]}`, in
/// evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary(Vec<SubSuiteSummary>);

impl ReportSummary {
    pub fn sub_suites(&self) -> &[SubSuiteSummary] {
        &self.0
    }

    /// Entries of the sub-suite called `name`.
    pub fn get(&self, name: &str) -> Option<&[SummaryEntry]> {
        self.0
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
    }

    /// Every entry, in order.
    pub fn entries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.0.iter().flat_map(|s| s.entries.iter())
    }

    /// Whether any test failed.
    pub fn has_failures(&self) -> bool {
        self.entries().any(|e| e.outcome == Outcome::Failed)
    }

    /// Count of tests per outcome.
    pub fn tally(&self) -> OutcomeTally {
        let mut tally = OutcomeTally::default();
        for entry in self.entries() {
            match entry.outcome {
                Outcome::Passed => tally.passed += 1,
                Outcome::Failed => tally.failed += 1,
                Outcome::Skipped => tally.skipped += 1,
                Outcome::Unknown => tally.unknown += 1,
            }
        }
        tally
    }
}

impl Serialize for ReportSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for sub_suite in &self.0 {
            map.serialize_entry(&sub_suite.name, &sub_suite.entries)?;
        }
        map.end()
    }
}

/// Tests per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unknown: usize,
}

/// A finished report tree.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    meta: ReportMeta,
    root: NodeId,
    nodes: Vec<ReportNode>,
    summary: ReportSummary,
}

impl Report {
    pub(crate) fn new(meta: ReportMeta, nodes: Vec<ReportNode>, root: NodeId) -> Self {
        let summary = summarize(&nodes);
        Self {
            meta,
            root,
            nodes,
            summary,
        }
    }

    pub fn meta(&self) -> &ReportMeta {
        &self.meta
    }

    pub fn project(&self) -> &str {
        &self.meta.project
    }

    pub fn document_digest(&self) -> Option<&str> {
        self.meta.document_digest.as_deref()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The parent suite.
    pub fn root_node(&self) -> &ReportNode {
        &self.nodes[self.root.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&ReportNode> {
        self.nodes.get(id.index())
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[ReportNode] {
        &self.nodes
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ReportNode> {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.node(*c))
    }

    pub fn of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &ReportNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// The first test with the given statement.
    pub fn find_test(&self, statement: &str) -> Option<&ReportNode> {
        self.of_kind(NodeKind::Test).find(|n| n.name == statement)
    }

    /// The nearest ancestor of `id` (inclusive) of the given kind.
    pub fn ancestor(&self, id: NodeId, kind: NodeKind) -> Option<&ReportNode> {
        let mut current = self.node(id);
        while let Some(node) = current {
            if node.kind == kind {
                return Some(node);
            }
            current = node.parent.and_then(|p| self.node(p));
        }
        None
    }

    /// Test outcomes in evaluation order.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.of_kind(NodeKind::Test).map(|n| n.status).collect()
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }
}

fn summarize(nodes: &[ReportNode]) -> ReportSummary {
    let sub_suites = nodes
        .iter()
        .filter(|n| n.kind == NodeKind::SubSuite)
        .map(|sub_suite| SubSuiteSummary {
            name: sub_suite.name.clone(),
            entries: sub_suite
                .children
                .iter()
                .filter_map(|c| nodes.get(c.index()))
                .map(|test| SummaryEntry {
                    statement: test.name.clone(),
                    outcome: test.status,
                })
                .collect(),
        })
        .collect();
    ReportSummary(sub_suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ReportBuilder;
    use serde_json::json;

    fn sample() -> Report {
        let mut b = ReportBuilder::new(ReportMeta::new("p").with_document_digest("abc"));
        b.open_parent_suite("Model").unwrap();
        b.open_suite("Basics").unwrap();
        b.open_sub_suite("Types").unwrap();
        b.record_test("type present", Outcome::Passed, vec![], vec![]).unwrap();
        b.record_test("type base", Outcome::Failed, vec![], vec![]).unwrap();
        b.close_sub_suite().unwrap();
        b.open_sub_suite("Status").unwrap();
        b.close_sub_suite().unwrap();
        b.close_suite().unwrap();
        b.close_parent_suite().unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn summary_is_keyed_by_sub_suite_in_order() {
        let report = sample();
        let v = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(
            v,
            json!({
                "Types": [
                    {"statement": "type present", "outcome": "passed"},
                    {"statement": "type base", "outcome": "failed"}
                ],
                "Status": []
            })
        );
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["Types", "Status"]);
    }

    #[test]
    fn tally_and_failures() {
        let report = sample();
        assert!(report.summary().has_failures());
        let tally = report.summary().tally();
        assert_eq!((tally.passed, tally.failed), (1, 1));
        assert_eq!(report.outcomes(), [Outcome::Passed, Outcome::Failed]);
    }

    #[test]
    fn navigation() {
        let report = sample();
        let test = report.find_test("type base").unwrap();
        assert_eq!(
            report.ancestor(test.id, NodeKind::SubSuite).unwrap().name,
            "Types"
        );
        assert_eq!(
            report.ancestor(test.id, NodeKind::ParentSuite).unwrap().id,
            report.root()
        );
        assert_eq!(report.children(report.root()).count(), 1);
        assert_eq!(report.document_digest(), Some("abc"));
    }

    #[test]
    fn every_child_has_one_parent() {
        let report = sample();
        for node in report.nodes() {
            for child in &node.children {
                assert_eq!(report.node(*child).unwrap().parent, Some(node.id));
            }
            let listed = report
                .nodes()
                .iter()
                .filter(|n| n.children.contains(&node.id))
                .count();
            assert_eq!(listed, usize::from(node.parent.is_some()));
        }
    }
}
