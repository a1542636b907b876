//! # Context Resolver
//!
//! Fetches remote JSON-LD context documents over HTTP and caches them by URL.
//!
//! Resolution happens before any JSON-LD algorithm runs:
//! [`ContextResolver::resolve_all`] walks every context reference reachable
//! from a document and returns a [`ResolvedContexts`] snapshot, which the
//! processor then serves to the JSON-LD library from memory.
//!
//! One attempt per URL. A fetch that exceeds [`ResolverConfig::timeout`],
//! cannot connect, answers with a non-success status or returns a body that
//! is not JSON yields a [`ResolutionError`] carrying the URL.
//!
//! ## Limits
//!
//! - At most [`MAX_REMOTE_CONTEXTS`] distinct URLs per document.
//! - One [`ResolverConfig::deadline`] for the whole of
//!   [`ContextResolver::resolve_all`], however many fetches it makes.
//! - The shared [`ContextCache`] holds at most its capacity; documents
//!   beyond it are served but not retained.
//! - Loopback, private and link-local hosts are refused unless
//!   [`ResolverConfig::allow_private_hosts`] is set.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::time::Instant;
use url::{Host, Url};

use crate::bundled;
use crate::error::ResolutionError;

/// Media types requested from context hosts.
pub const ACCEPT: &str = "application/ld+json, application/json";

/// Default fetch timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Default bound on one `resolve_all` call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(100);

/// Distinct remote contexts one document may pull in, nested ones included.
pub const MAX_REMOTE_CONTEXTS: usize = 10;

/// Default number of documents a [`ContextCache`] retains.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Resolver behaviour.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound for one context fetch.
    pub timeout: Duration,
    /// Upper bound for resolving every context of one document.
    pub deadline: Duration,
    /// Refuse network fetches; only cached documents resolve.
    pub offline: bool,
    /// Seed the cache with the bundled context snapshots.
    pub preload_bundled: bool,
    /// Fetch from loopback, private and link-local hosts.
    pub allow_private_hosts: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
            offline: false,
            preload_bundled: true,
            allow_private_hosts: false,
        }
    }
}

/// URL → context document cache. Clones share storage.
#[derive(Debug, Clone)]
pub struct ContextCache {
    inner: Arc<RwLock<HashMap<String, Arc<Value>>>>,
    capacity: usize,
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ContextCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cache retaining at most `capacity` documents.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// A cache seeded with the bundled snapshots.
    pub fn with_bundled() -> Self {
        let cache = Self::new();
        cache.preload_bundled();
        cache
    }

    /// Insert the bundled snapshots, keeping any entry already present.
    pub fn preload_bundled(&self) {
        let mut inner = self.inner.write();
        for (url, document) in bundled::documents() {
            inner
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(document));
        }
    }

    /// Cached document for `url`.
    pub fn get(&self, url: &str) -> Option<Arc<Value>> {
        self.inner.read().get(url).cloned()
    }

    /// Store `document` under `url`, replacing any previous entry. Returns
    /// `false` when the cache is full and `url` is new.
    pub fn insert(&self, url: impl Into<String>, document: Arc<Value>) -> bool {
        let url = url.into();
        let mut inner = self.inner.write();
        if inner.len() >= self.capacity && !inner.contains_key(&url) {
            tracing::warn!(url = %url, capacity = self.capacity, "context cache full, not retaining");
            return false;
        }
        inner.insert(url, document);
        true
    }

    /// Maximum number of retained documents.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `url` is cached.
    pub fn contains(&self, url: &str) -> bool {
        self.inner.read().contains_key(url)
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// The contexts a document needs, resolved up front.
#[derive(Debug, Clone, Default)]
pub struct ResolvedContexts {
    documents: HashMap<String, Arc<Value>>,
}

impl ResolvedContexts {
    /// Resolved URLs, sorted.
    pub fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    /// Number of resolved documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document resolved for `url`.
    pub fn get(&self, url: &str) -> Option<Arc<Value>> {
        self.documents.get(url).cloned()
    }

    /// Add `document` under `url`.
    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), Arc::new(document));
    }

    /// Every `(url, document)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents
            .iter()
            .map(|(url, document)| (url.as_str(), document.as_ref()))
    }

    pub(crate) fn extend(&mut self, other: ResolvedContexts) {
        self.documents.extend(other.documents);
    }
}

/// Fetches and caches context documents.
#[derive(Debug, Clone)]
pub struct ContextResolver {
    http: reqwest::Client,
    cache: ContextCache,
    config: ResolverConfig,
}

impl ContextResolver {
    /// A resolver with its own cache.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_cache(config, ContextCache::new())
    }

    /// A resolver backed by a shared cache.
    pub fn with_cache(config: ResolverConfig, cache: ContextCache) -> Self {
        if config.preload_bundled {
            cache.preload_bundled();
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { http, cache, config }
    }

    /// The cache this resolver reads and populates.
    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one context URL, from cache when possible.
    pub async fn resolve(&self, url: &str) -> Result<Arc<Value>, ResolutionError> {
        if let Some(document) = self.cache.get(url) {
            tracing::trace!(url = %url, "context cache hit");
            return Ok(document);
        }
        validate_url(url, self.config.allow_private_hosts)?;
        if self.config.offline {
            return Err(ResolutionError::Offline { url: url.to_string() });
        }

        tracing::debug!(url = %url, "fetching context");
        let document = match tokio::time::timeout(self.config.timeout, self.fetch(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ResolutionError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.config.timeout.as_secs(),
                })
            }
        };
        let document = Arc::new(document);
        self.cache.insert(url, Arc::clone(&document));
        Ok(document)
    }

    async fn fetch(&self, url: &str) -> Result<Value, ResolutionError> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            tracing::warn!(url = %url, status, "context fetch returned error status");
            return Err(ResolutionError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        serde_json::from_slice(&body).map_err(|e| ResolutionError::InvalidBody {
            url: url.to_string(),
            details: e.to_string(),
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ResolutionError {
        if err.is_timeout() {
            ResolutionError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            ResolutionError::Unreachable {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Resolve every context reachable from `document`: its own `@context`
    /// entries, scoped contexts inside inline term definitions, and the
    /// references made by each fetched context in turn.
    pub async fn resolve_all(&self, document: &Value) -> Result<ResolvedContexts, ResolutionError> {
        let deadline = Instant::now() + self.config.deadline;
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut references = Vec::new();
        collect_references(document, None, &mut references);
        enqueue(references, &mut seen, &mut queue)?;

        let mut resolved = ResolvedContexts::default();
        while let Some(url) = queue.pop_front() {
            let fetched = match tokio::time::timeout_at(deadline, self.resolve(&url)).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(url = %url, resolved = resolved.len(), "context resolution deadline exceeded");
                    return Err(ResolutionError::Timeout {
                        url,
                        timeout_secs: self.config.deadline.as_secs(),
                    });
                }
            };
            let mut nested = Vec::new();
            collect_references(&fetched, Some(&url), &mut nested);
            enqueue(nested, &mut seen, &mut queue)?;
            resolved.documents.insert(url, fetched);
        }
        tracing::debug!(count = resolved.len(), "contexts resolved");
        Ok(resolved)
    }
}

fn enqueue(
    references: Vec<String>,
    seen: &mut HashSet<String>,
    queue: &mut VecDeque<String>,
) -> Result<(), ResolutionError> {
    for reference in references {
        if seen.contains(&reference) {
            continue;
        }
        if seen.len() >= MAX_REMOTE_CONTEXTS {
            return Err(ResolutionError::TooManyContexts {
                url: reference,
                limit: MAX_REMOTE_CONTEXTS,
            });
        }
        seen.insert(reference.clone());
        queue.push_back(reference);
    }
    Ok(())
}

fn validate_url(url: &str, allow_private_hosts: bool) -> Result<(), ResolutionError> {
    let parsed = match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
        _ => return Err(ResolutionError::InvalidUrl { url: url.to_string() }),
    };
    if !allow_private_hosts && parsed.host().is_some_and(|host| is_private_host(&host)) {
        tracing::warn!(url = %url, "refusing context on a private host");
        return Err(ResolutionError::PrivateHost { url: url.to_string() });
    }
    Ok(())
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_ipv4(ip),
        Host::Ipv6(ip) => is_private_ipv6(ip),
    }
}

fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_ip(&IpAddr::V4(mapped));
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

/// Every string under an `@context` or `@import` key, resolved against
/// `base` when one is known.
fn collect_references(value: &Value, base: Option<&str>, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "@context" || key == "@import" {
                    let items: Vec<&Value> = match child {
                        Value::Array(items) => items.iter().collect(),
                        other => vec![other],
                    };
                    for item in items {
                        if let Value::String(reference) = item {
                            out.push(resolve_reference(base, reference));
                        }
                    }
                }
                collect_references(child, base, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, base, out);
            }
        }
        _ => {}
    }
}

/// `reference` resolved against `base`; unchanged when either does not
/// parse.
fn resolve_reference(base: Option<&str>, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    base.and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(reference).ok())
        .map(String::from)
        .unwrap_or_else(|| reference.to_string())
}
