//! # Semantic Processing Errors
//!
//! Three layers:
//!
//! - [`ResolutionError`]: a context document could not be fetched.
//! - [`ProcessingError`]: a JSON-LD algorithm rejected its input. Carries
//!   the `{type, code, url?, details?}` shape reported to users.
//! - [`SemanticError`]: what [`SemanticProcessor`](crate::SemanticProcessor)
//!   operations return: either of the above.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// A remote context could not be obtained.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The reference is not an absolute http(s) URL.
    #[error("invalid context URL {url:?}")]
    InvalidUrl {
        /// The offending reference.
        url: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("timed out fetching context {url} after {timeout_secs}s")]
    Timeout {
        /// Context URL.
        url: String,
        /// The timeout that elapsed.
        timeout_secs: u64,
    },

    /// Connection-level failure (DNS, refused, TLS).
    #[error("context host unreachable for {url}: {source}")]
    Unreachable {
        /// Context URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("context {url} returned HTTP {status}")]
    Status {
        /// Context URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body was not a JSON document.
    #[error("context {url} is not valid JSON: {details}")]
    InvalidBody {
        /// Context URL.
        url: String,
        /// Parser message.
        details: String,
    },

    /// Network access is disabled and the context is not cached.
    #[error("context {url} is not cached and network fetches are disabled")]
    Offline {
        /// Context URL.
        url: String,
    },

    /// The host is loopback, private or link-local.
    #[error("context {url} is on a private host")]
    PrivateHost {
        /// Context URL.
        url: String,
    },

    /// The document pulls in more remote contexts than allowed.
    #[error("more than {limit} remote contexts, refusing {url}")]
    TooManyContexts {
        /// The first reference over the limit.
        url: String,
        /// The limit.
        limit: usize,
    },
}

impl ResolutionError {
    /// The URL the failure relates to.
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url }
            | Self::Timeout { url, .. }
            | Self::Unreachable { url, .. }
            | Self::Status { url, .. }
            | Self::InvalidBody { url, .. }
            | Self::Offline { url }
            | Self::PrivateHost { url }
            | Self::TooManyContexts { url, .. } => url,
        }
    }
}

/// Error families, rendered as the `type` field of an error object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A context or document reference is not a usable URL.
    #[serde(rename = "jsonld.InvalidUrl")]
    InvalidUrl,
    /// A remote document could not be loaded.
    #[serde(rename = "jsonld.LoadDocumentError")]
    LoadDocumentError,
    /// Malformed context or document structure.
    #[serde(rename = "jsonld.SyntaxError")]
    SyntaxError,
    /// Compaction failure.
    #[serde(rename = "jsonld.CompactError")]
    CompactError,
    /// Framing failure.
    #[serde(rename = "jsonld.FrameError")]
    FrameError,
    /// Any other processor failure.
    #[serde(rename = "jsonld.ProcessingError")]
    ProcessingError,
}

impl ErrorKind {
    /// Wire name, e.g. `jsonld.SyntaxError`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "jsonld.InvalidUrl",
            Self::LoadDocumentError => "jsonld.LoadDocumentError",
            Self::SyntaxError => "jsonld.SyntaxError",
            Self::CompactError => "jsonld.CompactError",
            Self::FrameError => "jsonld.FrameError",
            Self::ProcessingError => "jsonld.ProcessingError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! error_codes {
    ($( $(#[$doc:meta])* $variant:ident => $text:literal, $kind:ident; )*) => {
        /// JSON-LD 1.1 error codes raised by the processor.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $( $(#[$doc])* $variant, )*
        }

        impl ErrorCode {
            /// Every code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[ $( Self::$variant, )* ];

            /// The code as written in the JSON-LD 1.1 API.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )*
                }
            }

            /// The error family this code belongs to.
            pub fn kind(self) -> ErrorKind {
                match self {
                    $( Self::$variant => ErrorKind::$kind, )*
                }
            }
        }
    };
}

error_codes! {
    LoadingDocumentFailed => "loading document failed", LoadDocumentError;
    LoadingRemoteContextFailed => "loading remote context failed", LoadDocumentError;
    InvalidRemoteContext => "invalid remote context", SyntaxError;
    RecursiveContextInclusion => "recursive context inclusion", SyntaxError;
    ContextOverflow => "context overflow", SyntaxError;
    InvalidLocalContext => "invalid local context", SyntaxError;
    InvalidContextNullification => "invalid context nullification", SyntaxError;
    InvalidContextEntry => "invalid context entry", SyntaxError;
    InvalidVersionValue => "invalid @version value", SyntaxError;
    InvalidImportValue => "invalid @import value", SyntaxError;
    InvalidBaseIri => "invalid base IRI", SyntaxError;
    InvalidVocabMapping => "invalid vocab mapping", SyntaxError;
    InvalidDefaultLanguage => "invalid default language", SyntaxError;
    InvalidBaseDirection => "invalid base direction", SyntaxError;
    InvalidPropagateValue => "invalid @propagate value", SyntaxError;
    InvalidProtectedValue => "invalid @protected value", SyntaxError;
    CyclicIriMapping => "cyclic IRI mapping", SyntaxError;
    InvalidTermDefinition => "invalid term definition", SyntaxError;
    KeywordRedefinition => "keyword redefinition", SyntaxError;
    ProtectedTermRedefinition => "protected term redefinition", SyntaxError;
    InvalidTypeMapping => "invalid type mapping", SyntaxError;
    InvalidIriMapping => "invalid IRI mapping", SyntaxError;
    InvalidKeywordAlias => "invalid keyword alias", SyntaxError;
    InvalidContainerMapping => "invalid container mapping", SyntaxError;
    InvalidScopedContext => "invalid scoped context", SyntaxError;
    InvalidLanguageMapping => "invalid language mapping", SyntaxError;
    InvalidPrefixValue => "invalid @prefix value", SyntaxError;
    CollidingKeywords => "colliding keywords", SyntaxError;
    InvalidIdValue => "invalid @id value", SyntaxError;
    InvalidTypeValue => "invalid type value", SyntaxError;
    InvalidValueObject => "invalid value object", SyntaxError;
    InvalidValueObjectValue => "invalid value object value", SyntaxError;
    InvalidLanguageTaggedString => "invalid language-tagged string", SyntaxError;
    InvalidLanguageTaggedValue => "invalid language-tagged value", SyntaxError;
    InvalidTypedValue => "invalid typed value", SyntaxError;
    InvalidIndexValue => "invalid @index value", SyntaxError;
    InvalidSetOrListObject => "invalid set or list object", SyntaxError;
    InvalidLanguageMapValue => "invalid language map value", SyntaxError;
    InvalidIncludedValue => "invalid @included value", SyntaxError;
    ConflictingIndexes => "conflicting indexes", SyntaxError;
    IriConfusedWithPrefix => "IRI confused with prefix", CompactError;
    InvalidFrame => "invalid frame", FrameError;
    InvalidEmbedValue => "invalid @embed value", FrameError;
    ProcessingFailed => "processing failed", ProcessingError;
}

impl ErrorCode {
    /// The most specific code named in a processor message, matched
    /// case-insensitively.
    pub fn from_message(message: &str) -> Option<Self> {
        let message = message.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .filter(|code| message.contains(&code.as_str().to_lowercase()))
            .max_by_key(|code| code.as_str().len())
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON-LD algorithm failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {code}{}", .details.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
pub struct ProcessingError {
    /// Error family.
    pub kind: ErrorKind,
    /// JSON-LD error code.
    pub code: ErrorCode,
    /// The URL involved, for loading failures.
    pub url: Option<String>,
    /// Free-form detail, typically the offending term or value.
    pub details: Option<Value>,
}

impl ProcessingError {
    /// An error with the code's default family and no extra detail.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            kind: code.kind(),
            code,
            url: None,
            details: None,
        }
    }

    /// Attach the URL the error relates to.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach detail.
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Override the family.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Render as `{type, code, url?, details?}`.
    pub fn to_error_object(&self) -> Value {
        let mut obj = json!({
            "type": self.kind.as_str(),
            "code": self.code.as_str(),
        });
        if let Some(url) = &self.url {
            obj["url"] = Value::String(url.clone());
        }
        if let Some(details) = &self.details {
            obj["details"] = details.clone();
        }
        obj
    }
}

/// Error returned by semantic operations.
#[derive(Error, Debug)]
pub enum SemanticError {
    /// Context resolution failed before processing could start.
    #[error("context resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// The JSON-LD processor rejected the document or a context.
    #[error("JSON-LD processing failed: {0}")]
    Processing(#[from] ProcessingError),
}

impl SemanticError {
    /// Render as the `{type, code, url?, details?}` object attached to
    /// failed assertions.
    pub fn to_error_object(&self) -> Value {
        match self {
            Self::Processing(err) => err.to_error_object(),
            Self::Resolution(err) => {
                let (kind, code) = match err {
                    ResolutionError::InvalidUrl { .. } | ResolutionError::PrivateHost { .. } => {
                        (ErrorKind::InvalidUrl, ErrorCode::LoadingRemoteContextFailed)
                    }
                    ResolutionError::TooManyContexts { .. } => {
                        (ErrorKind::SyntaxError, ErrorCode::ContextOverflow)
                    }
                    _ => (ErrorKind::LoadDocumentError, ErrorCode::LoadingRemoteContextFailed),
                };
                json!({
                    "type": kind.as_str(),
                    "code": code.as_str(),
                    "url": err.url(),
                    "details": err.to_string(),
                })
            }
        }
    }
}
