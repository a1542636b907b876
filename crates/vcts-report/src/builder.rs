//! # Report Builder
//!
//! Accumulates a report tree for one evaluation. The builder keeps a stack
//! of open nodes; `open_*` pushes, `close_*` pops, and `record_*` creates a
//! terminal node under the innermost open node. Every operation checks that
//! the innermost open node is of the kind the new node must hang under, so
//! a report that finishes is always a well-formed five-level tree.
//!
//! Timestamps come from a [`Clock`] and are clamped so they never go
//! backwards within one builder. Each timestamp is written once, at
//! creation or close.
//!
//! ```
//! use vcts_core::Outcome;
//! use vcts_report::{ReportBuilder, ReportMeta};
//!
//! let mut b = ReportBuilder::new(ReportMeta::new("demo"));
//! b.open_parent_suite("Model").unwrap();
//! b.open_suite("Basics").unwrap();
//! b.open_sub_suite("Types").unwrap();
//! b.record_test("type is present", Outcome::Passed, vec![], vec![]).unwrap();
//! b.close_sub_suite().unwrap();
//! b.close_suite().unwrap();
//! b.close_parent_suite().unwrap();
//! let report = b.finish().unwrap();
//! assert_eq!(report.root_node().status, Outcome::Passed);
//! ```

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use vcts_core::{EpochMicros, Outcome};

use crate::node::{Attachment, Link, NodeId, NodeKind, ReportNode};
use crate::report::{Report, ReportMeta};

/// Source of node timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> EpochMicros;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> EpochMicros {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> EpochMicros {
        (**self).now()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMicros {
        EpochMicros::now()
    }
}

/// Misuse of the builder protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A node was opened or recorded without its parent kind innermost.
    #[error("cannot add {kind} node: expected an open {expected} node, found {found}")]
    MissingParent {
        kind: NodeKind,
        expected: NodeKind,
        found: OpenNode,
    },

    /// A close call named a kind that is not innermost.
    #[error("cannot close {requested}: innermost open node is {found}")]
    NotInnermost {
        requested: NodeKind,
        found: OpenNode,
    },

    /// A node-level operation was called with nothing open.
    #[error("no node is open")]
    NoOpenNode,

    /// A second parent suite was opened.
    #[error("report already has a parent suite")]
    RootExists,

    /// `finish` was called with nodes still open.
    #[error("cannot finish report: {open} node(s) still open")]
    Unclosed { open: usize },

    /// `finish` was called before any parent suite was opened.
    #[error("cannot finish report: no parent suite was opened")]
    Empty,
}

/// The innermost open node at the time of an error, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenNode {
    None,
    Kind(NodeKind),
}

impl fmt::Display for OpenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("nothing"),
            Self::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Builds one [`Report`].
pub struct ReportBuilder {
    meta: ReportMeta,
    nodes: Vec<ReportNode>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    clock: Box<dyn Clock>,
    last: EpochMicros,
}

impl fmt::Debug for ReportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportBuilder")
            .field("meta", &self.meta)
            .field("nodes", &self.nodes.len())
            .field("open", &self.stack.len())
            .finish()
    }
}

impl ReportBuilder {
    /// A builder on the system clock.
    pub fn new(meta: ReportMeta) -> Self {
        Self::with_clock(meta, SystemClock)
    }

    /// A builder on a caller-supplied clock.
    pub fn with_clock(meta: ReportMeta, clock: impl Clock + 'static) -> Self {
        Self {
            meta,
            nodes: Vec::new(),
            stack: Vec::new(),
            root: None,
            clock: Box::new(clock),
            last: EpochMicros::from_micros(i64::MIN),
        }
    }

    /// Number of currently open nodes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open the report root.
    pub fn open_parent_suite(&mut self, name: impl Into<String>) -> Result<NodeId, StructuralError> {
        if self.root.is_some() {
            return Err(StructuralError::RootExists);
        }
        let id = self.push(NodeKind::ParentSuite, name.into())?;
        self.root = Some(id);
        self.stack.push(id);
        Ok(id)
    }

    /// Open a suite under the parent suite.
    pub fn open_suite(&mut self, name: impl Into<String>) -> Result<NodeId, StructuralError> {
        self.open(NodeKind::Suite, name.into())
    }

    /// Open a sub-suite under the innermost suite.
    pub fn open_sub_suite(&mut self, name: impl Into<String>) -> Result<NodeId, StructuralError> {
        self.open(NodeKind::SubSuite, name.into())
    }

    /// Open a test that will own steps. Its status is settled by
    /// [`close_test`](Self::close_test).
    pub fn open_test(
        &mut self,
        name: impl Into<String>,
        links: Vec<Link>,
        attachments: Vec<Attachment>,
    ) -> Result<NodeId, StructuralError> {
        let id = self.open(NodeKind::Test, name.into())?;
        let node = self.node_mut(id);
        node.links = links;
        node.attachments = attachments;
        Ok(id)
    }

    /// Record a terminal test with an explicit outcome.
    pub fn record_test(
        &mut self,
        name: impl Into<String>,
        outcome: Outcome,
        links: Vec<Link>,
        attachments: Vec<Attachment>,
    ) -> Result<NodeId, StructuralError> {
        self.record(NodeKind::Test, name.into(), outcome, links, attachments)
    }

    /// Record a step under the open test.
    pub fn record_step(
        &mut self,
        name: impl Into<String>,
        outcome: Outcome,
        links: Vec<Link>,
        attachments: Vec<Attachment>,
    ) -> Result<NodeId, StructuralError> {
        self.record(NodeKind::Step, name.into(), outcome, links, attachments)
    }

    /// Close the open test. An explicit `outcome` wins; otherwise the test
    /// takes the meet of its steps.
    pub fn close_test(&mut self, outcome: Option<Outcome>) -> Result<NodeId, StructuralError> {
        self.close(NodeKind::Test, outcome)
    }

    pub fn close_sub_suite(&mut self) -> Result<NodeId, StructuralError> {
        self.close(NodeKind::SubSuite, None)
    }

    pub fn close_suite(&mut self) -> Result<NodeId, StructuralError> {
        self.close(NodeKind::Suite, None)
    }

    pub fn close_parent_suite(&mut self) -> Result<NodeId, StructuralError> {
        self.close(NodeKind::ParentSuite, None)
    }

    /// Attach `link` to the innermost open node.
    pub fn add_link(&mut self, link: Link) -> Result<(), StructuralError> {
        let id = *self.stack.last().ok_or(StructuralError::NoOpenNode)?;
        self.node_mut(id).links.push(link);
        Ok(())
    }

    /// Hand off the finished tree.
    pub fn finish(self) -> Result<Report, StructuralError> {
        if !self.stack.is_empty() {
            return Err(StructuralError::Unclosed {
                open: self.stack.len(),
            });
        }
        let root = self.root.ok_or(StructuralError::Empty)?;
        tracing::debug!(
            project = %self.meta.project,
            nodes = self.nodes.len(),
            "report finished"
        );
        Ok(Report::new(self.meta, self.nodes, root))
    }

    fn tick(&mut self) -> EpochMicros {
        let now = self.clock.now().max(self.last);
        self.last = now;
        now
    }

    fn innermost(&self) -> OpenNode {
        match self.stack.last() {
            Some(id) => OpenNode::Kind(self.nodes[id.index()].kind),
            None => OpenNode::None,
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ReportNode {
        &mut self.nodes[id.index()]
    }

    /// Create a node of `kind` under the innermost open node, checking the
    /// hierarchy. Does not touch the stack.
    fn push(&mut self, kind: NodeKind, name: String) -> Result<NodeId, StructuralError> {
        let parent = match kind.parent() {
            None => None,
            Some(expected) => {
                let found = self.innermost();
                if found != OpenNode::Kind(expected) {
                    return Err(StructuralError::MissingParent {
                        kind,
                        expected,
                        found,
                    });
                }
                self.stack.last().copied()
            }
        };
        let at = self.tick();
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(ReportNode::new(id, kind, name, parent, at));
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        Ok(id)
    }

    fn open(&mut self, kind: NodeKind, name: String) -> Result<NodeId, StructuralError> {
        let id = self.push(kind, name)?;
        self.stack.push(id);
        Ok(id)
    }

    fn record(
        &mut self,
        kind: NodeKind,
        name: String,
        outcome: Outcome,
        links: Vec<Link>,
        attachments: Vec<Attachment>,
    ) -> Result<NodeId, StructuralError> {
        let id = self.push(kind, name)?;
        let node = self.node_mut(id);
        node.status = outcome;
        node.links = links;
        node.attachments = attachments;
        tracing::trace!(kind = %kind, name = %node.name, outcome = %outcome, "recorded");
        Ok(id)
    }

    fn close(&mut self, kind: NodeKind, explicit: Option<Outcome>) -> Result<NodeId, StructuralError> {
        let found = self.innermost();
        if found != OpenNode::Kind(kind) {
            return Err(StructuralError::NotInnermost {
                requested: kind,
                found,
            });
        }
        let Some(id) = self.stack.pop() else {
            return Err(StructuralError::NotInnermost {
                requested: kind,
                found,
            });
        };
        let at = self.tick();
        let status = match explicit {
            Some(outcome) => outcome,
            None => {
                let children = &self.nodes[id.index()].children;
                Outcome::aggregate(children.iter().map(|c| self.nodes[c.index()].status))
            }
        };
        let node = self.node_mut(id);
        node.stop = at;
        node.status = status;
        tracing::trace!(kind = %kind, name = %node.name, outcome = %status, "closed");
        Ok(id)
    }
}
