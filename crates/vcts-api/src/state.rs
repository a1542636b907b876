//! # Application State
//!
//! Shared state for the Axum application. Cloned into every handler; the
//! context cache inside the semantic processor is shared by all clones and
//! bounded, and contexts on private hosts are refused.

use std::sync::Arc;

use vcts_jsonld::resolver::DEFAULT_CACHE_CAPACITY;
use vcts_jsonld::{ContextCache, ContextResolver, ResolverConfig, SemanticProcessor};
use vcts_report::{sink, AllureSink, SinkError};
use vcts_suite::Settings;

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Semantic processor backed by one context cache for the process.
    pub semantics: SemanticProcessor,
    /// Reporting sink. `None` when `ALLURE_API` is unset.
    pub sink: Option<AllureSink>,
}

impl AppState {
    /// Build state from settings.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if a reporting sink is configured but its
    /// client cannot be built.
    pub fn new(settings: Settings) -> Result<Self, SinkError> {
        let sink = match &settings.allure_api {
            Some(url) => Some(AllureSink::new(url.as_str(), sink::DEFAULT_TIMEOUT)?),
            None => None,
        };
        // Contexts named in request bodies must not reach internal hosts.
        let config = ResolverConfig {
            allow_private_hosts: false,
            ..settings.resolver_config()
        };
        if settings.allow_private_hosts {
            tracing::warn!("VCTS_ALLOW_PRIVATE_HOSTS is ignored by the HTTP front end");
        }
        let cache = ContextCache::with_capacity(DEFAULT_CACHE_CAPACITY);
        let resolver = ContextResolver::with_cache(config, cache);
        Ok(Self {
            settings: Arc::new(settings),
            semantics: SemanticProcessor::new(resolver),
            sink,
        })
    }
}
