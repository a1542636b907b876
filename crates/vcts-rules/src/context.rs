//! `@context` assertions.

use serde_json::Value;
use vcts_core::{is_absolute_uri, Document, Outcome};

/// The context every v2 credential must list first.
pub const CREDENTIALS_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// `@context` is present.
pub fn context_present(document: &Document) -> Outcome {
    Outcome::from_bool(document.contains("@context"))
}

/// Understanding a context is a property of the consuming application.
pub fn context_understood(_document: &Document) -> Outcome {
    Outcome::Unknown
}

/// `@context` is an array whose first element is the v2 base context.
pub fn context_base_url(document: &Document) -> Outcome {
    let Some(context) = document.get("@context") else {
        return Outcome::Skipped;
    };
    let first_is_base = context
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(|first| first.as_str() == Some(CREDENTIALS_V2));
    Outcome::from_bool(first_is_base)
}

/// Every entry after the first is an absolute URL string or an object.
pub fn context_items_valid(document: &Document) -> Outcome {
    let items = match document.get("@context") {
        Some(Value::Array(items)) if items.len() > 1 => items,
        _ => return Outcome::Skipped,
    };
    Outcome::from_bool(items[1..].iter().all(is_context_item))
}

fn is_context_item(item: &Value) -> bool {
    match item {
        Value::String(url) => is_absolute_uri(url),
        Value::Object(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn missing_context_fails_presence_and_skips_the_rest() {
        let d = doc(json!({}));
        assert_eq!(context_present(&d), Outcome::Failed);
        assert_eq!(context_base_url(&d), Outcome::Skipped);
        assert_eq!(context_items_valid(&d), Outcome::Skipped);
    }

    #[test]
    fn base_url_must_come_first_in_an_array() {
        let ok = doc(json!({"@context": [CREDENTIALS_V2, "https://www.w3.org/ns/credentials/examples/v2"]}));
        assert_eq!(context_base_url(&ok), Outcome::Passed);

        let string = doc(json!({"@context": CREDENTIALS_V2}));
        assert_eq!(context_base_url(&string), Outcome::Failed);

        let second = doc(json!({"@context": ["https://example.org/ctx", CREDENTIALS_V2]}));
        assert_eq!(context_base_url(&second), Outcome::Failed);

        let empty = doc(json!({"@context": []}));
        assert_eq!(context_base_url(&empty), Outcome::Failed);
    }

    #[test]
    fn subsequent_items_are_urls_or_objects() {
        let ok = doc(json!({"@context": [CREDENTIALS_V2, "https://example.org/ctx", {"name": "https://schema.org/name"}]}));
        assert_eq!(context_items_valid(&ok), Outcome::Passed);

        let number = doc(json!({"@context": [CREDENTIALS_V2, 42]}));
        assert_eq!(context_items_valid(&number), Outcome::Failed);

        let relative = doc(json!({"@context": [CREDENTIALS_V2, "ctx.jsonld"]}));
        assert_eq!(context_items_valid(&relative), Outcome::Failed);
    }

    #[test]
    fn single_item_context_skips_item_check() {
        let d = doc(json!({"@context": [CREDENTIALS_V2]}));
        assert_eq!(context_items_valid(&d), Outcome::Skipped);
    }

    #[test]
    fn understanding_is_never_automated() {
        assert_eq!(context_understood(&doc(json!({}))), Outcome::Unknown);
    }
}
