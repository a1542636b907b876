//! # vcts CLI Entry Point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vcts_cli::evaluate::{run_evaluate, run_export, EvaluateArgs, ExportArgs};
use vcts_cli::jsonld::{run_normalize, run_undefined, JsonLdArgs};
use vcts_suite::Settings;

/// Conformance evaluation of credentials against the W3C Verifiable
/// Credentials Data Model 2.0.
#[derive(Parser, Debug)]
#[command(name = "vcts", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a credential and print the summary.
    Evaluate(EvaluateArgs),

    /// Evaluate a credential and write Allure result files.
    Export(ExportArgs),

    /// Print the URDNA2015 canonical N-Quads of a document.
    Normalize(JsonLdArgs),

    /// Print properties and types not defined by the document's contexts.
    Undefined(JsonLdArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Evaluate(args) => run_evaluate(&args, &settings, &mut stdout),
        Commands::Export(args) => run_export(&args, &settings, &mut stdout),
        Commands::Normalize(args) => run_normalize(&args, &settings, &mut stdout),
        Commands::Undefined(args) => run_undefined(&args, &settings, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
