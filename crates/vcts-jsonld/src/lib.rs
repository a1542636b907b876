//! # vcts-jsonld — Semantic Processing for Credential Documents
//!
//! Resolves a credential's JSON-LD contexts and runs the JSON-LD operations
//! the conformance rules need: compaction, expansion, flattening, framing
//! and URDNA2015 normalization, plus detection of properties and types the
//! declared context does not define.
//!
//! ## Architecture
//!
//! - [`resolver`]: async HTTP fetching with a shared URL cache, seeded from
//!   the [`bundled`] context snapshots. Produces a [`ResolvedContexts`] set.
//! - [`processor`]: the [`JsonLdProcessor`] trait and
//!   [`LinkedDataProcessor`], which runs the `json-ld` crate over the
//!   resolved contexts and canonicalizes with `rdf-canon`. Never touches
//!   the network.
//! - [`framing`]: frame matching and embedding over flattened output.
//! - [`semantic`]: [`SemanticProcessor`], which resolves first and then
//!   delegates to the injected processor.
//! - [`diff`]: the structural comparison behind undefined-property detection.
//!
//! ## Crate Policy
//!
//! - Depends only on `vcts-core` internally.
//! - Errors are typed ([`ResolutionError`], [`ProcessingError`],
//!   [`SemanticError`]); nothing here panics on malformed input.

pub mod bundled;
pub mod diff;
pub mod error;
pub mod framing;
pub mod processor;
pub mod resolver;
pub mod semantic;

pub use error::{ErrorCode, ErrorKind, ProcessingError, ResolutionError, SemanticError};
pub use processor::{JsonLdProcessor, LinkedDataProcessor};
pub use resolver::{ContextCache, ContextResolver, ResolvedContexts, ResolverConfig, MAX_REMOTE_CONTEXTS};
pub use semantic::{SemanticAnalysis, SemanticProcessor};
