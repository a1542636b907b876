//! # Evaluate and Export Subcommands
//!
//! `vcts evaluate` prints the same `{"vc_data_model": ..}` body the HTTP
//! front end returns. `vcts export` writes the Allure result, container and
//! attachment files of the full report to a directory, for upload by other
//! tooling or inspection with `allure serve`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use vcts_core::Document;
use vcts_report::allure;
use vcts_suite::{Completed, Evaluation, Settings, DEFAULT_PROJECT};

use crate::{read_json, runtime, ResolverArgs};

/// Arguments for `vcts evaluate`.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Credential to evaluate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Reporting project label.
    #[arg(long, default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Run JSON-LD semantic analysis of the declared contexts.
    #[arg(long)]
    pub semantics: bool,

    #[command(flatten)]
    pub resolver: ResolverArgs,

    /// Exit with code 2 when any assertion failed.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `vcts export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Credential to evaluate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output directory for the Allure files. Created if missing.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Reporting project label.
    #[arg(long, default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Run JSON-LD semantic analysis of the declared contexts.
    #[arg(long)]
    pub semantics: bool,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute `vcts evaluate`.
pub fn run_evaluate(args: &EvaluateArgs, settings: &Settings, out: &mut impl Write) -> Result<u8> {
    let completed = evaluate_file(
        &args.file,
        &args.project,
        args.semantics,
        &args.resolver,
        settings,
    )?;

    let mut body = json!({ "vc_data_model": completed.summary() });
    if args.semantics {
        body["semantics"] = serde_json::to_value(&completed.semantics)?;
    }
    serde_json::to_writer_pretty(&mut *out, &body)?;
    writeln!(out)?;

    let summary = completed.summary();
    if args.strict && summary.has_failures() {
        let tally = summary.tally();
        tracing::warn!(failed = tally.failed, "evaluation found failed assertions");
        return Ok(2);
    }
    Ok(0)
}

/// Execute `vcts export`.
pub fn run_export(args: &ExportArgs, settings: &Settings, out: &mut impl Write) -> Result<u8> {
    let completed = evaluate_file(
        &args.file,
        &args.project,
        args.semantics,
        &args.resolver,
        settings,
    )?;
    let files = allure::export(&completed.report);
    allure::write_dir(&files, &args.out)
        .with_context(|| format!("failed to write results to {}", args.out.display()))?;
    writeln!(
        out,
        "OK: wrote {} files to {}",
        files.len(),
        args.out.display()
    )?;
    Ok(0)
}

fn evaluate_file(
    file: &Path,
    project: &str,
    semantics: bool,
    resolver: &ResolverArgs,
    settings: &Settings,
) -> Result<Completed> {
    let value = read_json(file)?;
    let document = Document::from_value(value)
        .with_context(|| format!("{} is not a credential", file.display()))?;

    let mut evaluation = Evaluation::new(document).with_project(project);
    if semantics {
        evaluation = evaluation.with_semantics(resolver.processor(settings)?);
    }
    let completed = runtime()?.block_on(evaluation.evaluate())?;
    Ok(completed)
}
