//! Context snapshots shipped with the crate, used to seed the resolver cache
//! so common credentials resolve without network access.

use serde_json::Value;

/// VC Data Model 2.0 base context.
pub const CREDENTIALS_V2_URL: &str = "https://www.w3.org/ns/credentials/v2";
/// Examples context used throughout the VC Data Model 2.0 text.
pub const EXAMPLES_V2_URL: &str = "https://www.w3.org/ns/credentials/examples/v2";
/// VC Data Model 1.1 base context.
pub const CREDENTIALS_V1_URL: &str = "https://www.w3.org/2018/credentials/v1";

const CREDENTIALS_V2: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/contexts/credentials-v2.jsonld"));
const EXAMPLES_V2: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/contexts/examples-v2.jsonld"));
const CREDENTIALS_V1: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/contexts/credentials-v1.jsonld"));

/// Every bundled `(url, document)` pair. Snapshots that fail to parse are
/// skipped with a warning rather than poisoning the cache.
pub fn documents() -> Vec<(&'static str, Value)> {
    [
        (CREDENTIALS_V2_URL, CREDENTIALS_V2),
        (EXAMPLES_V2_URL, EXAMPLES_V2),
        (CREDENTIALS_V1_URL, CREDENTIALS_V1),
    ]
    .into_iter()
    .filter_map(|(url, raw)| match serde_json::from_str(raw) {
        Ok(document) => Some((url, document)),
        Err(err) => {
            tracing::warn!(url, error = %err, "bundled context snapshot is not valid JSON");
            None
        }
    })
    .collect()
}
