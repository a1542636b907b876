//! # vcts-cli — Conformance Engine Command-Line Interface
//!
//! ## Subcommands
//!
//! - `evaluate`: evaluate a credential file and print the summary
//! - `export`: evaluate and write Allure result files to a directory
//! - `normalize`: print the URDNA2015 N-Quads of a document
//! - `undefined`: print undefined properties and types
//!
//! Handlers return the process exit code: `0` on success, `2` when
//! `evaluate --strict` finds a failed outcome. Errors map to `1` in `main`.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the library crates; no rule logic here.
//! - Handlers write to a caller-supplied writer so tests can capture output.

pub mod evaluate;
pub mod jsonld;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use vcts_jsonld::{ContextResolver, SemanticProcessor};
use vcts_suite::Settings;

/// Context resolution flags shared by every subcommand that runs JSON-LD
/// processing.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolverArgs {
    /// Resolve contexts from the bundled snapshots only.
    #[arg(long)]
    pub offline: bool,

    /// Upper bound for one context fetch, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl ResolverArgs {
    /// Build a semantic processor from `settings`, with these flags taking
    /// precedence.
    pub fn processor(&self, settings: &Settings) -> Result<SemanticProcessor> {
        let mut config = settings.resolver_config();
        if self.offline {
            config.offline = true;
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                bail!("--timeout-secs must be greater than zero");
            }
            config.timeout = Duration::from_secs(secs);
        }
        tracing::debug!(offline = config.offline, timeout = ?config.timeout, "context resolver configured");
        Ok(SemanticProcessor::new(ContextResolver::new(config)))
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Single-threaded runtime for one command.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
