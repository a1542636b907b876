//! # vcts-core — Foundational Types for the Conformance Engine
//!
//! This crate is the leaf of the `vcts` workspace. It defines the vocabulary
//! every other crate speaks: the assertion [`Outcome`] lattice, the read-only
//! [`Document`] under test, the lexical checks the rule set is built from
//! (RFC 3986 absolute URIs, XML Schema `dateTimeStamp`), and the canonical
//! serialization path used for digests and content-addressed names.
//!
//! ## Key Design Principles
//!
//! 1. **Outcomes form a lattice.** Containers never compute their status ad
//!    hoc; they take the [`Outcome::meet`] of their children, so a `failed`
//!    child can never be hidden behind a `passed` parent.
//!
//! 2. **Documents are immutable input.** [`Document`] exposes read access
//!    only. Derived forms (expanded, compacted) are separately owned values.
//!
//! 3. **Explicit predicates.** JSON truthiness is one function,
//!    [`is_truthy`], instead of scattered loose checks.
//!
//! 4. **`sha256_digest()` accepts only `&CanonicalBytes`.** Every digest and
//!    content-derived identifier flows through JCS canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vcts-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod document;
pub mod error;
pub mod iri;
pub mod outcome;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{content_uuid, sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use document::{is_truthy, Document};
pub use error::CoreError;
pub use iri::is_absolute_uri;
pub use outcome::Outcome;
pub use temporal::{DateTimeStamp, EpochMicros};
