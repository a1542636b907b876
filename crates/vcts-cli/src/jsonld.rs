//! # JSON-LD Inspection Subcommands
//!
//! `vcts normalize` prints canonical N-Quads; `vcts undefined` prints the
//! properties and types the declared contexts leave undefined. Both run
//! against any JSON-LD document, not only credentials.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use serde_json::Value;
use vcts_jsonld::{SemanticError, SemanticProcessor};
use vcts_suite::Settings;

use crate::{read_json, runtime, ResolverArgs};

/// Arguments shared by `vcts normalize` and `vcts undefined`.
#[derive(Args, Debug)]
pub struct JsonLdArgs {
    /// JSON-LD document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute `vcts normalize`.
pub fn run_normalize(args: &JsonLdArgs, settings: &Settings, out: &mut impl Write) -> Result<u8> {
    let (processor, document) = load(args, settings)?;
    let nquads = runtime()?
        .block_on(processor.normalize(&document))
        .map_err(processing_failed)?;
    out.write_all(nquads.as_bytes())?;
    Ok(0)
}

/// Execute `vcts undefined`. Prints
/// `{"undefinedProperties": [..], "undefinedTypes": [..]}`.
pub fn run_undefined(args: &JsonLdArgs, settings: &Settings, out: &mut impl Write) -> Result<u8> {
    let (processor, document) = load(args, settings)?;
    let analysis = runtime()?
        .block_on(processor.analyze(&document))
        .map_err(processing_failed)?;
    if !analysis.is_clean() {
        tracing::info!(
            properties = analysis.undefined_properties.len(),
            types = analysis.undefined_types.len(),
            "undefined terms found"
        );
    }
    serde_json::to_writer_pretty(&mut *out, &analysis)?;
    writeln!(out)?;
    Ok(0)
}

fn load(args: &JsonLdArgs, settings: &Settings) -> Result<(SemanticProcessor, Value)> {
    let document = read_json(&args.file)?;
    let processor = args.resolver.processor(settings)?;
    Ok((processor, document))
}

fn processing_failed(err: SemanticError) -> anyhow::Error {
    anyhow!("JSON-LD processing failed: {}", err.to_error_object())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{offline, write_json};
    use serde_json::json;

    fn args(file: PathBuf) -> JsonLdArgs {
        JsonLdArgs {
            file,
            resolver: offline(),
        }
    }

    #[test]
    fn normalize_prints_nquads() {
        let (_dir, path) = write_json(
            "doc.json",
            &json!({
                "@context": {"@vocab": "https://example.org/"},
                "@id": "https://example.org/thing",
                "name": "Thing"
            }),
        );
        let mut out = Vec::new();
        assert_eq!(run_normalize(&args(path), &Settings::default(), &mut out).unwrap(), 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "<https://example.org/thing> <https://example.org/name> \"Thing\" .\n"
        );
    }

    #[test]
    fn undefined_lists_both_kinds() {
        let (_dir, path) = write_json(
            "doc.json",
            &json!({
                "@context": {"id": "@id", "type": "@type", "name": "https://schema.org/name"},
                "type": "Widget",
                "name": "w",
                "extra": true
            }),
        );
        let mut out = Vec::new();
        assert_eq!(run_undefined(&args(path), &Settings::default(), &mut out).unwrap(), 0);
        let body: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(body["undefinedProperties"], json!(["extra"]));
        assert_eq!(body["undefinedTypes"], json!(["Widget"]));
    }

    #[test]
    fn unresolvable_context_is_an_error() {
        let (_dir, path) = write_json(
            "doc.json",
            &json!({"@context": "https://example.org/not-cached", "a": 1}),
        );
        let mut out = Vec::new();
        let err = run_undefined(&args(path), &Settings::default(), &mut out).unwrap_err();
        assert!(err.to_string().contains("JSON-LD processing failed"));
    }
}
