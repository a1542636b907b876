//! # Semantic Processor
//!
//! Runs the JSON-LD operations over a credential against its own declared
//! context, and detects terms that context does not define.
//!
//! Every operation first resolves the document's contexts through the
//! [`ContextResolver`], then hands the document and the resolved set to the
//! injected [`JsonLdProcessor`].
//!
//! ## Undefined-term detection
//!
//! - **Properties**: compaction drops keys the context cannot map to an
//!   absolute IRI. The document is compacted against its own `@context` and
//!   diffed against the original; every removed key is undefined. An object
//!   holding only `id` plus undefined keys collapses to its identifier
//!   string during compaction, so a type change from object to scalar
//!   reports the object's other keys.
//! - **Types**: every value under `@type` in the expanded form must be an
//!   absolute URI; anything else was not mapped by the context.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use vcts_core::is_absolute_uri;

use crate::diff::{diff, Change};
use crate::error::{ErrorCode, ProcessingError, SemanticError};
use crate::processor::{JsonLdProcessor, LinkedDataProcessor};
use crate::resolver::{ContextResolver, ResolvedContexts};

/// Result of both undefined-term detections over one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticAnalysis {
    /// Keys dropped by compaction.
    pub undefined_properties: Vec<String>,
    /// `@type` values that did not expand to absolute URIs.
    pub undefined_types: Vec<String>,
}

impl SemanticAnalysis {
    /// Whether every property and type is defined.
    pub fn is_clean(&self) -> bool {
        self.undefined_properties.is_empty() && self.undefined_types.is_empty()
    }
}

/// JSON-LD operations over a credential and its declared context.
#[derive(Clone)]
pub struct SemanticProcessor {
    resolver: ContextResolver,
    processor: Arc<dyn JsonLdProcessor>,
}

impl std::fmt::Debug for SemanticProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticProcessor")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl SemanticProcessor {
    /// A processor backed by [`LinkedDataProcessor`].
    pub fn new(resolver: ContextResolver) -> Self {
        Self::with_processor(resolver, Arc::new(LinkedDataProcessor))
    }

    /// A processor delegating to `processor`.
    pub fn with_processor(resolver: ContextResolver, processor: Arc<dyn JsonLdProcessor>) -> Self {
        Self { resolver, processor }
    }

    /// The resolver supplying remote contexts.
    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    async fn resolve(&self, values: &[&Value]) -> Result<ResolvedContexts, SemanticError> {
        let mut resolved = ResolvedContexts::default();
        for value in values {
            resolved.extend(self.resolver.resolve_all(value).await?);
        }
        Ok(resolved)
    }

    /// Compact `document` against its own `@context`.
    pub async fn compact(&self, document: &Value) -> Result<Value, SemanticError> {
        let contexts = self.resolve(&[document]).await?;
        self.compact_with(document, &contexts)
    }

    fn compact_with(&self, document: &Value, contexts: &ResolvedContexts) -> Result<Value, SemanticError> {
        let context = declared_context(document)?;
        Ok(self.processor.compact(document, context, contexts)?)
    }

    /// Expanded form of `document`.
    pub async fn expand(&self, document: &Value) -> Result<Value, SemanticError> {
        let contexts = self.resolve(&[document]).await?;
        Ok(self.processor.expand(document, &contexts)?)
    }

    /// Flattened form of `document`, without compaction.
    pub async fn flatten(&self, document: &Value) -> Result<Value, SemanticError> {
        let contexts = self.resolve(&[document]).await?;
        Ok(self.processor.flatten(document, None, &contexts)?)
    }

    /// Frame `document` with `frame`.
    pub async fn frame(&self, document: &Value, frame: &Value) -> Result<Value, SemanticError> {
        let contexts = self.resolve(&[document, frame]).await?;
        Ok(self.processor.frame(document, frame, &contexts)?)
    }

    /// URDNA2015 canonical N-Quads of `document`.
    pub async fn normalize(&self, document: &Value) -> Result<String, SemanticError> {
        let contexts = self.resolve(&[document]).await?;
        Ok(self.processor.normalize(document, &contexts)?)
    }

    /// Succeeds when `document` compacts against its own context.
    pub async fn validate_context(&self, document: &Value) -> Result<(), SemanticError> {
        self.compact(document).await.map(|_| ())
    }

    /// Keys the declared context does not define.
    pub async fn find_undefined_properties(&self, document: &Value) -> Result<Vec<String>, SemanticError> {
        let compacted = self.compact(document).await?;
        Ok(undefined_properties(document, &compacted))
    }

    /// `@type` values the declared context does not define.
    pub async fn find_undefined_types(&self, document: &Value) -> Result<Vec<String>, SemanticError> {
        let expanded = self.expand(document).await?;
        Ok(undefined_types(&expanded))
    }

    /// Both detections over a single context resolution.
    pub async fn analyze(&self, document: &Value) -> Result<SemanticAnalysis, SemanticError> {
        let contexts = self.resolve(&[document]).await?;
        let compacted = self.compact_with(document, &contexts)?;
        let expanded = self.processor.expand(document, &contexts)?;
        let analysis = SemanticAnalysis {
            undefined_properties: undefined_properties(document, &compacted),
            undefined_types: undefined_types(&expanded),
        };
        tracing::debug!(
            properties = analysis.undefined_properties.len(),
            types = analysis.undefined_types.len(),
            "semantic analysis complete"
        );
        Ok(analysis)
    }
}

fn declared_context(document: &Value) -> Result<&Value, ProcessingError> {
    document.get("@context").ok_or_else(|| {
        ProcessingError::new(ErrorCode::InvalidLocalContext)
            .with_details("document has no @context")
    })
}

/// Keys of `original` lost in `compacted`.
pub fn undefined_properties(original: &Value, compacted: &Value) -> Vec<String> {
    let mut undefined = Vec::new();
    for change in diff(original, compacted) {
        match change {
            Change::KeyRemoved { path } => {
                if let Some(key) = path.last_key() {
                    undefined.push(key.to_string());
                }
            }
            Change::TypeChanged {
                old_value: Value::Object(old),
                ..
            } => {
                undefined.extend(old.keys().filter(|k| *k != "id").cloned());
            }
            Change::TypeChanged { .. } => {}
        }
    }
    undefined
}

/// `@type` values in `expanded` that are not absolute URIs, first
/// occurrence order, without duplicates.
pub fn undefined_types(expanded: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_types(expanded, &mut found);
    let mut undefined: Vec<String> = Vec::new();
    for value in found {
        if !is_absolute_uri(&value) && !undefined.contains(&value) {
            undefined.push(value);
        }
    }
    undefined
}

fn collect_types(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "@type" {
                    match child {
                        Value::String(s) => out.push(s.clone()),
                        Value::Array(items) => {
                            out.extend(items.iter().filter_map(Value::as_str).map(str::to_string))
                        }
                        _ => {}
                    }
                } else {
                    collect_types(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_types(item, out);
            }
        }
        _ => {}
    }
}
