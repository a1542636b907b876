//! Allure export.
//!
//! A [`Report`] becomes a flat list of Allure result files:
//!
//! - `{uuid}-result.json` for every test, with its steps embedded;
//! - `{uuid}-container.json` for every suite level, listing its children;
//! - `{source}` for every distinct attachment payload.
//!
//! Test `historyId`/`testCaseId` are name-based UUIDs, so the same
//! statement keeps its history across runs.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use serde_json::{json, Value};
use uuid::Uuid;
use vcts_core::EpochMicros;

use crate::node::{Attachment, Link, NodeKind, ReportNode};
use crate::report::Report;

/// `language` label on every test result.
pub const LANGUAGE: &str = "Rust";
/// `framework` label on every test result.
pub const FRAMEWORK: &str = "vcts";

/// One file of an Allure result directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllureFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl AllureFile {
    fn json(file_name: String, value: &Value) -> Self {
        Self {
            file_name,
            content: serde_json::to_vec_pretty(value).unwrap_or_default(),
        }
    }
}

/// Allure timestamps are epoch milliseconds.
fn millis(t: EpochMicros) -> i64 {
    t.as_micros().div_euclid(1000)
}

fn name_uuid(name: &str, suffix: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, format!("{name}{suffix}").as_bytes())
}

fn links_json(links: &[Link]) -> Vec<Value> {
    links
        .iter()
        .map(|l| json!({"name": l.name, "url": l.url, "type": "link"}))
        .collect()
}

fn attachments_json(attachments: &[Attachment]) -> Vec<Value> {
    attachments
        .iter()
        .map(|a| json!({"name": a.name, "source": a.source, "type": a.content_type}))
        .collect()
}

fn label(name: &str, value: &str) -> Value {
    json!({"name": name, "value": value})
}

fn step_json(step: &ReportNode) -> Value {
    json!({
        "name": step.name,
        "status": step.status,
        "stage": "finished",
        "start": millis(step.start),
        "stop": millis(step.stop),
        "parameters": [],
        "attachments": attachments_json(&step.attachments),
        "steps": [],
    })
}

fn ancestor_name<'r>(report: &'r Report, node: &ReportNode, kind: NodeKind) -> &'r str {
    report
        .ancestor(node.id, kind)
        .map(|n| n.name.as_str())
        .unwrap_or_default()
}

/// The `-result.json` body of a test node.
pub fn test_result(report: &Report, test: &ReportNode) -> Value {
    let steps: Vec<Value> = report.children(test.id).map(step_json).collect();
    json!({
        "uuid": test.uuid,
        "historyId": name_uuid(&test.name, "history"),
        "testCaseId": name_uuid(&test.name, "case"),
        "name": test.name,
        "fullName": test.name,
        "links": links_json(&test.links),
        "labels": [
            label("parentSuite", ancestor_name(report, test, NodeKind::ParentSuite)),
            label("suite", ancestor_name(report, test, NodeKind::Suite)),
            label("subSuite", ancestor_name(report, test, NodeKind::SubSuite)),
            label("package", report.project()),
            label("language", LANGUAGE),
            label("framework", FRAMEWORK),
        ],
        "parameters": [],
        "attachments": attachments_json(&test.attachments),
        "status": test.status,
        "statusDetails": {"known": false, "muted": false, "flaky": false},
        "stage": "finished",
        "start": millis(test.start),
        "stop": millis(test.stop),
        "steps": steps,
    })
}

/// The `-container.json` body of a suite-level node.
pub fn container(report: &Report, suite: &ReportNode) -> Value {
    let children: Vec<Uuid> = report.children(suite.id).map(|c| c.uuid).collect();
    json!({
        "uuid": suite.uuid,
        "name": suite.name,
        "children": children,
        "links": links_json(&suite.links),
        "befores": [],
        "afters": [],
        "start": millis(suite.start),
        "stop": millis(suite.stop),
    })
}

/// Every file of the Allure result directory for `report`: test results,
/// then containers, then attachments. Attachments shared by several nodes
/// are emitted once.
pub fn export(report: &Report) -> Vec<AllureFile> {
    let mut files = Vec::new();
    for test in report.of_kind(NodeKind::Test) {
        files.push(AllureFile::json(
            format!("{}-result.json", test.uuid),
            &test_result(report, test),
        ));
    }
    for suite in report.nodes().iter().filter(|n| n.kind.is_container()) {
        files.push(AllureFile::json(
            format!("{}-container.json", suite.uuid),
            &container(report, suite),
        ));
    }
    let mut seen = HashSet::new();
    for attachment in report.nodes().iter().flat_map(|n| n.attachments.iter()) {
        if seen.insert(attachment.source.as_str()) {
            files.push(AllureFile {
                file_name: attachment.source.clone(),
                content: attachment.body(),
            });
        }
    }
    tracing::debug!(project = %report.project(), files = files.len(), "allure export built");
    files
}

/// Write `files` into `dir`, creating it if needed.
pub fn write_dir(files: &[AllureFile], dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for file in files {
        std::fs::write(dir.join(&file.file_name), &file.content)?;
    }
    Ok(())
}
