//! # vcts-report — Conformance Report Model and Export
//!
//! The report is a strict five-level tree,
//! `ParentSuite → Suite → SubSuite → Test → Step`, stored as an arena of
//! [`ReportNode`]s addressed by [`NodeId`]. A [`ReportBuilder`] lives for a
//! single evaluation and hands off an immutable [`Report`] on
//! [`finish`](ReportBuilder::finish).
//!
//! ## Status Derivation
//!
//! Tests and steps carry explicit outcomes. Containers take the
//! [`Outcome::meet`](vcts_core::Outcome::meet) of their children when they
//! close, so a container holding a `failed` child is never `passed`. A test
//! opened with [`ReportBuilder::open_test`] takes the meet of its steps
//! unless it is closed with an explicit outcome.
//!
//! ## Export
//!
//! [`allure::export`] renders a report as Allure result, container and
//! attachment files; [`AllureSink`] uploads them to an
//! allure-docker-service instance.
//!
//! ## Crate Policy
//!
//! - Depends on `vcts-core` only among workspace crates.
//! - Builder misuse is a [`StructuralError`], never a panic.

pub mod allure;
pub mod builder;
pub mod node;
pub mod report;
pub mod sink;

pub use allure::AllureFile;
pub use builder::{Clock, OpenNode, ReportBuilder, StructuralError, SystemClock};
pub use node::{Attachment, Link, NodeId, NodeKind, ReportNode, JSON_MIME};
pub use report::{OutcomeTally, Report, ReportMeta, ReportSummary, SubSuiteSummary, SummaryEntry};
pub use sink::{AllureSink, ResultEntry, SinkError};
