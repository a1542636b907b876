//! # Evaluation Typestate
//!
//! An evaluation moves through `Idle → Running → Completed`. Each phase is
//! a distinct type, so an evaluation cannot be run twice and a report
//! cannot be read before the run finished:
//!
//! ```text
//! Evaluation<Idle> ──start()──▶ Evaluation<Running> ──run()──▶ Completed
//! ```
//!
//! [`Evaluation::start`] is the only suspending phase: it performs the
//! optional semantic analysis, which may fetch remote contexts. Rule
//! evaluation and report building are synchronous.

use std::fmt;

use serde_json::json;
use vcts_core::{sha256_hex, CanonicalBytes, Document};
use vcts_jsonld::SemanticProcessor;
use vcts_report::{
    Attachment, Clock, Link, Report, ReportBuilder, ReportMeta, ReportSummary, SystemClock,
};
use vcts_rules::{context_terms_defined, RuleId, SemanticVerdict};

use crate::error::EvaluationError;
use crate::sections::{Section, PARENT_SUITE, SUITES};

/// Project label used when none is given.
pub const DEFAULT_PROJECT: &str = "vc-data-model";

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::Running {}
}

/// Marker trait for evaluation phases.
pub trait EvaluationState: sealed::Sealed {
    fn name() -> &'static str;
}

/// Configured, not yet started.
pub struct Idle {
    semantics: Option<SemanticProcessor>,
    clock: Box<dyn Clock>,
}

/// Semantic analysis done; the report root is open.
#[derive(Debug)]
pub struct Running {
    builder: ReportBuilder,
    verdict: SemanticVerdict,
    document_attachment: Attachment,
}

impl EvaluationState for Idle {
    fn name() -> &'static str {
        "IDLE"
    }
}

impl EvaluationState for Running {
    fn name() -> &'static str {
        "RUNNING"
    }
}

impl fmt::Debug for Idle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Idle")
            .field("semantics", &self.semantics)
            .finish_non_exhaustive()
    }
}

/// One evaluation of one document.
#[derive(Debug)]
pub struct Evaluation<S: EvaluationState> {
    document: Document,
    project: String,
    state: S,
}

impl<S: EvaluationState> Evaluation<S> {
    /// The phase name, e.g. `"RUNNING"`.
    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl Evaluation<Idle> {
    /// Prepare an evaluation of `document` without semantic analysis.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            project: DEFAULT_PROJECT.to_string(),
            state: Idle {
                semantics: None,
                clock: Box::new(SystemClock),
            },
        }
    }

    /// Report under `project`.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Run `context-terms-defined` through `processor`.
    pub fn with_semantics(mut self, processor: SemanticProcessor) -> Self {
        self.state.semantics = Some(processor);
        self
    }

    /// Stamp report nodes from `clock`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.state.clock = Box::new(clock);
        self
    }

    /// Analyze the document and open the report.
    ///
    /// Analysis runs only with a processor and an `@context`. Its failures
    /// become part of the semantic verdict, never an error here.
    pub async fn start(self) -> Result<Evaluation<Running>, EvaluationError> {
        let Self {
            document,
            project,
            state,
        } = self;
        let value = document.to_value();
        let digest = sha256_hex(&CanonicalBytes::new(&value)?);
        tracing::info!(project = %project, digest = %digest, "evaluation started");

        let analysis = match &state.semantics {
            Some(processor) if document.contains("@context") => {
                Some(processor.analyze(&value).await)
            }
            Some(_) => {
                tracing::debug!("document has no @context, semantic analysis skipped");
                None
            }
            None => None,
        };
        let verdict = context_terms_defined(&document, analysis.as_ref());

        let meta = ReportMeta::new(project.clone()).with_document_digest(digest);
        let mut builder = ReportBuilder::with_clock(meta, state.clock);
        builder.open_parent_suite(PARENT_SUITE)?;

        Ok(Evaluation {
            document,
            project,
            state: Running {
                builder,
                verdict,
                document_attachment: Attachment::json("Document", value),
            },
        })
    }

    /// Start and run to completion.
    pub async fn evaluate(self) -> Result<Completed, EvaluationError> {
        self.start().await?.run()
    }
}

impl Evaluation<Running> {
    /// Evaluate every section in order and finish the report.
    pub fn run(mut self) -> Result<Completed, EvaluationError> {
        for suite in SUITES.iter() {
            self.state.builder.open_suite(suite.name)?;
            for section in suite.sections {
                self.record_section(section)?;
            }
            self.state.builder.close_suite()?;
        }
        self.state.builder.close_parent_suite()?;

        let Running {
            builder, verdict, ..
        } = self.state;
        let report = builder.finish()?;
        let tally = report.summary().tally();
        tracing::info!(
            project = %self.project,
            passed = tally.passed,
            failed = tally.failed,
            skipped = tally.skipped,
            unknown = tally.unknown,
            "evaluation completed"
        );
        Ok(Completed {
            report,
            semantics: verdict,
        })
    }

    fn attachments(&self, section: &Section) -> Vec<Attachment> {
        let mut attachments = vec![self.state.document_attachment.clone()];
        for field in section.fields {
            if let Some(value) = self.document.get(field) {
                attachments.push(Attachment::json(format!("$.{field}"), value.clone()));
            }
        }
        attachments
    }

    fn record_section(&mut self, section: &Section) -> Result<(), EvaluationError> {
        self.state.builder.open_sub_suite(section.name)?;
        let spec_link = Link::new("Specification", section.link());
        self.state.builder.add_link(spec_link.clone())?;
        let links = vec![spec_link];
        let attachments = self.attachments(section);
        for rule in section.rules {
            match rule {
                RuleId::ContextTermsDefined => {
                    self.record_semantic(*rule, links.clone(), attachments.clone())?;
                }
                _ => {
                    let outcome = vcts_rules::evaluate(*rule, &self.document);
                    self.state.builder.record_test(
                        rule.statement(),
                        outcome,
                        links.clone(),
                        attachments.clone(),
                    )?;
                }
            }
        }
        self.state.builder.close_sub_suite()?;
        Ok(())
    }

    fn record_semantic(
        &mut self,
        rule: RuleId,
        links: Vec<Link>,
        mut attachments: Vec<Attachment>,
    ) -> Result<(), EvaluationError> {
        let verdict = &self.state.verdict;
        if let Some(error) = &verdict.error {
            attachments.push(Attachment::json("Error", error.clone()));
        }
        let steps: Vec<_> = verdict
            .steps
            .iter()
            .map(|step| {
                let attachments = if step.findings.is_empty() {
                    Vec::new()
                } else {
                    vec![Attachment::json("Undefined terms", json!(step.findings))]
                };
                (step.name, step.outcome, attachments)
            })
            .collect();
        let outcome = verdict.outcome;

        let builder = &mut self.state.builder;
        builder.open_test(rule.statement(), links, attachments)?;
        for (name, outcome, attachments) in steps {
            builder.record_step(name, outcome, Vec::new(), attachments)?;
        }
        builder.close_test(Some(outcome))?;
        tracing::debug!(rule = rule.as_str(), outcome = %outcome, "semantic rule recorded");
        Ok(())
    }
}

/// A finished evaluation.
#[derive(Debug, Clone)]
pub struct Completed {
    pub report: Report,
    /// The semantic verdict, including steps and any processing error.
    pub semantics: SemanticVerdict,
}

impl Completed {
    /// `{subSuiteName: [{statement, outcome}]}`.
    pub fn summary(&self) -> &ReportSummary {
        self.report.summary()
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

/// Evaluate `document` under `project`, with semantic analysis when a
/// processor is given.
pub async fn evaluate(
    document: Document,
    project: &str,
    semantics: Option<SemanticProcessor>,
) -> Result<Completed, EvaluationError> {
    let mut evaluation = Evaluation::new(document).with_project(project);
    if let Some(processor) = semantics {
        evaluation = evaluation.with_semantics(processor);
    }
    evaluation.evaluate().await
}
