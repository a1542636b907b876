//! # JSON-LD Processing
//!
//! The JSON-LD 1.1 operations the semantic layer consumes, behind the
//! [`JsonLdProcessor`] trait. [`LinkedDataProcessor`] implements them with
//! the `json-ld` crate and canonicalizes RDF with `rdf-canon`.
//!
//! Remote contexts never trigger network access here: every operation
//! receives the [`ResolvedContexts`] fetched up front and serves them to
//! the library from memory.

use std::collections::HashMap;
use std::fmt::{Display, Write as _};

use futures::executor::block_on;
use iref::IriBuf;
use json_ld::{JsonLdProcessor as _, RemoteContextReference, RemoteDocument};
use json_syntax::{Parse, Print};
use oxrdf::Dataset;
use oxttl::NQuadsParser;
use serde_json::{Map, Value};

use crate::error::{ErrorCode, ProcessingError};
use crate::framing;
use crate::resolver::ResolvedContexts;

/// IRI under which the compaction context is handed to the library.
const COMPACTION_CONTEXT_IRI: &str = "urn:vcts:compaction-context";

/// The JSON-LD operations the engine depends on.
pub trait JsonLdProcessor: Send + Sync {
    /// Expanded form of `document`.
    fn expand(&self, document: &Value, contexts: &ResolvedContexts) -> Result<Value, ProcessingError>;

    /// Compact `document` against `context`. The output carries `context`
    /// as its `@context`.
    fn compact(
        &self,
        document: &Value,
        context: &Value,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError>;

    /// Flatten `document`, compacting against `context` when given.
    fn flatten(
        &self,
        document: &Value,
        context: Option<&Value>,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError>;

    /// Frame `document` with `frame`.
    fn frame(
        &self,
        document: &Value,
        frame: &Value,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError>;

    /// RDF dataset of `document`.
    fn to_rdf(&self, document: &Value, contexts: &ResolvedContexts) -> Result<Dataset, ProcessingError>;

    /// URDNA2015 canonical N-Quads of `document`.
    fn normalize(&self, document: &Value, contexts: &ResolvedContexts) -> Result<String, ProcessingError> {
        let dataset = self.to_rdf(document, contexts)?;
        rdf_canon::canonicalize(&dataset).map_err(|err| failure(err, ErrorCode::ProcessingFailed))
    }
}

/// [`JsonLdProcessor`] over the `json-ld` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedDataProcessor;

type Loader = HashMap<IriBuf, RemoteDocument>;

impl LinkedDataProcessor {
    fn loader(contexts: &ResolvedContexts) -> Result<Loader, ProcessingError> {
        let mut loader = Loader::new();
        for (url, document) in contexts.iter() {
            let iri = IriBuf::new(url.to_string()).map_err(|_| {
                ProcessingError::new(ErrorCode::LoadingRemoteContextFailed).with_url(url)
            })?;
            loader.insert(iri.clone(), RemoteDocument::new(Some(iri), None, to_syntax(document)?));
        }
        Ok(loader)
    }

    fn compaction_context(loader: &mut Loader, context: &Value) -> Result<IriBuf, ProcessingError> {
        let iri = IriBuf::new(COMPACTION_CONTEXT_IRI.to_string())
            .map_err(|_| ProcessingError::new(ErrorCode::InvalidBaseIri))?;
        let wrapper = serde_json::json!({ "@context": context });
        loader.insert(
            iri.clone(),
            RemoteDocument::new(Some(iri.clone()), None, to_syntax(&wrapper)?),
        );
        Ok(iri)
    }

    /// Flattened node list, still in expanded form.
    pub(crate) fn flatten_expanded(
        &self,
        document: &Value,
        contexts: &ResolvedContexts,
    ) -> Result<Vec<Value>, ProcessingError> {
        let mut loader = Self::loader(contexts)?;
        let input = RemoteDocument::new(None, None, to_syntax(document)?);
        let mut generator = rdf_types::generator::Blank::new();
        let flattened = block_on(input.flatten(&mut generator, &mut loader))
            .map_err(|err| failure(err, ErrorCode::InvalidLocalContext))?;
        match from_syntax(&flattened)? {
            Value::Array(nodes) => Ok(nodes),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

impl JsonLdProcessor for LinkedDataProcessor {
    fn expand(&self, document: &Value, contexts: &ResolvedContexts) -> Result<Value, ProcessingError> {
        use json_ld::syntax::IntoJsonWithContext;

        let mut loader = Self::loader(contexts)?;
        let input = RemoteDocument::new(None, None, to_syntax(document)?);
        let expanded = block_on(input.expand(&mut loader))
            .map_err(|err| failure(err, ErrorCode::InvalidLocalContext))?;
        from_syntax(&json_syntax::Value::Array(
            expanded.into_iter().map(|object| object.into_json_with(&())).collect(),
        ))
    }

    fn compact(
        &self,
        document: &Value,
        context: &Value,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError> {
        let mut loader = Self::loader(contexts)?;
        let iri = Self::compaction_context(&mut loader, context)?;
        let input = RemoteDocument::new(None, None, to_syntax(document)?);
        let compacted = block_on(input.compact(RemoteContextReference::iri(iri), &mut loader))
            .map_err(|err| failure(err, ErrorCode::InvalidLocalContext))?;
        Ok(with_context(from_syntax(&compacted)?, context))
    }

    fn flatten(
        &self,
        document: &Value,
        context: Option<&Value>,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError> {
        let nodes = self.flatten_expanded(document, contexts)?;
        let Some(context) = context else {
            return Ok(Value::Array(nodes));
        };
        let compacted = self.compact(&Value::Array(nodes), context, contexts)?;
        Ok(into_graph(compacted))
    }

    fn frame(
        &self,
        document: &Value,
        frame: &Value,
        contexts: &ResolvedContexts,
    ) -> Result<Value, ProcessingError> {
        let (frame_document, wildcard_type) = framing::prepare(frame)?;
        let expanded_frame = match self.expand(&frame_document, contexts)? {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            _ => Value::Object(Map::new()),
        };
        let nodes = self.flatten_expanded(document, contexts)?;
        let framed = framing::select(&nodes, &expanded_frame, wildcard_type);
        let context = frame_document
            .get("@context")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        self.compact(&Value::Array(framed), &context, contexts)
    }

    fn to_rdf(&self, document: &Value, contexts: &ResolvedContexts) -> Result<Dataset, ProcessingError> {
        let mut loader = Self::loader(contexts)?;
        let input = RemoteDocument::new(None, None, to_syntax(document)?);
        let mut generator = rdf_types::generator::Blank::new();
        let mut rdf = block_on(input.to_rdf(&mut generator, &mut loader))
            .map_err(|err| failure(err, ErrorCode::InvalidLocalContext))?;

        let mut nquads = String::new();
        for quad in rdf.cloned_quads() {
            // Writing into a String cannot fail.
            let _ = writeln!(nquads, "{quad} .");
        }
        NQuadsParser::new()
            .for_reader(nquads.as_bytes())
            .collect::<Result<Dataset, _>>()
            .map_err(|err| failure(err, ErrorCode::ProcessingFailed))
    }
}

/// Map a library error onto the JSON-LD error code its message names.
fn failure(err: impl Display, fallback: ErrorCode) -> ProcessingError {
    let message = err.to_string();
    let code = ErrorCode::from_message(&message).unwrap_or(fallback);
    tracing::debug!(code = %code, error = %message, "JSON-LD processing failed");
    ProcessingError::new(code).with_details(message)
}

fn to_syntax(value: &Value) -> Result<json_syntax::Value, ProcessingError> {
    let text = serde_json::to_string(value).map_err(|err| failure(err, ErrorCode::LoadingDocumentFailed))?;
    json_syntax::Value::parse_str(&text)
        .map(|(parsed, _)| parsed)
        .map_err(|err| failure(err, ErrorCode::LoadingDocumentFailed))
}

fn from_syntax(value: &json_syntax::Value) -> Result<Value, ProcessingError> {
    serde_json::from_str(&value.compact_print().to_string())
        .map_err(|err| failure(err, ErrorCode::ProcessingFailed))
}

/// Put `context` first in a compacted object, replacing whatever the
/// library wrote there.
fn with_context(compacted: Value, context: &Value) -> Value {
    let mut out = Map::new();
    if !is_empty_context(context) {
        out.insert("@context".to_string(), context.clone());
    }
    match compacted {
        Value::Object(map) => {
            out.extend(map.into_iter().filter(|(key, _)| key != "@context"));
        }
        Value::Array(items) if !items.is_empty() => {
            out.insert("@graph".to_string(), Value::Array(items));
        }
        _ => {}
    }
    Value::Object(out)
}

fn is_empty_context(context: &Value) -> bool {
    match context {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Flattened output always holds its nodes under `@graph`.
fn into_graph(compacted: Value) -> Value {
    let Value::Object(mut map) = compacted else {
        return compacted;
    };
    if map.contains_key("@graph") {
        return Value::Object(map);
    }
    let context = map.shift_remove("@context");
    let mut out = Map::new();
    if let Some(context) = context {
        out.insert("@context".to_string(), context);
    }
    let nodes = if map.is_empty() { Vec::new() } else { vec![Value::Object(map)] };
    out.insert("@graph".to_string(), Value::Array(nodes));
    Value::Object(out)
}
