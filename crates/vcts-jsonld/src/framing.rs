//! Frame matching over a flattened node list.
//!
//! Both the document and the frame are expanded by the JSON-LD processor
//! first, so matching compares absolute IRIs. A top-level node matches when:
//!
//! - the frame lists `@id` values and the node's identifier is one of them;
//! - otherwise the frame lists `@type` values and the node has one of them
//!   (`"@type": {}` matches any typed node);
//! - otherwise the frame names properties and the node has at least one;
//! - otherwise the frame is empty and every node matches.
//!
//! Matched nodes embed the nodes they reference, once per branch, and
//! blank node identifiers referenced nowhere else are dropped.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::{ErrorCode, ProcessingError};

/// Validate `frame` and strip the parts expansion would reject. Returns the
/// frame to expand and whether it asked for any typed node.
pub fn prepare(frame: &Value) -> Result<(Value, bool), ProcessingError> {
    let object = match frame {
        Value::Object(map) => map,
        Value::Array(items) if items.len() == 1 => items[0].as_object().ok_or_else(|| invalid(frame))?,
        _ => return Err(invalid(frame)),
    };
    let mut prepared = Map::new();
    let mut wildcard_type = false;
    for (key, value) in object {
        if matches!(key.as_str(), "@type" | "type") && is_wildcard(value) {
            wildcard_type = true;
            continue;
        }
        if matches!(key.as_str(), "@embed" | "@explicit" | "@omitDefault" | "@requireAll") {
            continue;
        }
        prepared.insert(key.clone(), value.clone());
    }
    Ok((Value::Object(prepared), wildcard_type))
}

fn invalid(frame: &Value) -> ProcessingError {
    ProcessingError::new(ErrorCode::InvalidFrame).with_details(frame.to_string())
}

fn is_wildcard(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.len() == 1 && is_wildcard(&items[0]),
        _ => false,
    }
}

/// Matched nodes from `nodes` with their references embedded.
pub fn select(nodes: &[Value], frame: &Value, wildcard_type: bool) -> Vec<Value> {
    let index: HashMap<&str, &Value> = nodes
        .iter()
        .filter_map(|node| Some((node.get("@id")?.as_str()?, node)))
        .collect();
    let empty = Map::new();
    let frame = frame.as_object().unwrap_or(&empty);

    let mut framed: Vec<Value> = nodes
        .iter()
        .filter(|node| matches(node, frame, wildcard_type))
        .map(|node| embed(node, &index, &mut HashSet::new()))
        .collect();
    prune_blank_ids(&mut framed);
    framed
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    }
}

fn matches(node: &Value, frame: &Map<String, Value>, wildcard_type: bool) -> bool {
    let ids = strings(frame.get("@id"));
    if !ids.is_empty() {
        return node
            .get("@id")
            .and_then(Value::as_str)
            .is_some_and(|id| ids.contains(&id));
    }

    let node_types = strings(node.get("@type"));
    if wildcard_type {
        return !node_types.is_empty();
    }
    let types = strings(frame.get("@type"));
    if !types.is_empty() {
        return types.iter().any(|t| node_types.contains(t));
    }

    let properties: Vec<&String> = frame.keys().filter(|key| !key.starts_with('@')).collect();
    if properties.is_empty() {
        return true;
    }
    properties.iter().any(|key| node.get(key.as_str()).is_some())
}

fn embed(node: &Value, index: &HashMap<&str, &Value>, path: &mut HashSet<String>) -> Value {
    let Value::Object(map) = node else {
        return node.clone();
    };
    let id = map.get("@id").and_then(Value::as_str).map(str::to_string);
    if let Some(id) = &id {
        path.insert(id.clone());
    }

    let mut out = Map::new();
    for (key, value) in map {
        let embedded = if key.starts_with('@') && key != "@list" {
            value.clone()
        } else {
            embed_values(value, index, path)
        };
        out.insert(key.clone(), embedded);
    }

    if let Some(id) = &id {
        path.remove(id);
    }
    Value::Object(out)
}

fn embed_values(value: &Value, index: &HashMap<&str, &Value>, path: &mut HashSet<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|item| embed_values(item, index, path)).collect()),
        Value::Object(map) if map.len() == 1 => {
            if let Some(list) = map.get("@list") {
                let mut out = Map::new();
                out.insert("@list".to_string(), embed_values(list, index, path));
                return Value::Object(out);
            }
            match map.get("@id").and_then(Value::as_str) {
                Some(id) if !path.contains(id) => match index.get(id) {
                    Some(target) => embed(target, index, path),
                    None => value.clone(),
                },
                _ => value.clone(),
            }
        }
        other => other.clone(),
    }
}

fn prune_blank_ids(framed: &mut [Value]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for node in framed.iter() {
        count_blank_ids(node, &mut counts);
    }
    for node in framed.iter_mut() {
        remove_single_blank_ids(node, &counts);
    }
}

fn count_blank_ids(value: &Value, counts: &mut HashMap<String, usize>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "@id" {
                    if let Some(id) = child.as_str().filter(|id| id.starts_with("_:")) {
                        *counts.entry(id.to_string()).or_default() += 1;
                    }
                } else {
                    count_blank_ids(child, counts);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| count_blank_ids(item, counts)),
        _ => {}
    }
}

fn remove_single_blank_ids(value: &mut Value, counts: &HashMap<String, usize>) {
    match value {
        Value::Object(map) => {
            let single = map
                .get("@id")
                .and_then(Value::as_str)
                .is_some_and(|id| counts.get(id) == Some(&1));
            if single {
                map.shift_remove("@id");
            }
            for child in map.values_mut() {
                remove_single_blank_ids(child, counts);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| remove_single_blank_ids(item, counts)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TYPE_A: &str = "https://example.org/A";

    fn nodes() -> Vec<Value> {
        vec![
            json!({"@id": "https://example.org/a", "@type": [TYPE_A], "https://example.org/p": [{"@id": "_:b0"}]}),
            json!({"@id": "_:b0", "https://example.org/name": [{"@value": "inner"}]}),
            json!({"@id": "https://example.org/c", "https://example.org/q": [{"@value": 1}]}),
        ]
    }

    #[test]
    fn frames_must_be_objects() {
        assert!(prepare(&json!({"@context": {}})).is_ok());
        let err = prepare(&json!("frame")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFrame);
    }

    #[test]
    fn wildcard_types_are_stripped_before_expansion() {
        let (prepared, wildcard) = prepare(&json!({"type": {}, "@embed": "@always"})).unwrap();
        assert!(wildcard);
        assert_eq!(prepared, json!({}));
    }

    #[test]
    fn type_frames_embed_referenced_nodes() {
        let framed = select(&nodes(), &json!({"@type": [TYPE_A]}), false);
        assert_eq!(
            framed,
            [json!({
                "@id": "https://example.org/a",
                "@type": [TYPE_A],
                "https://example.org/p": [{"https://example.org/name": [{"@value": "inner"}]}]
            })]
        );
    }

    #[test]
    fn property_frames_match_by_presence() {
        let framed = select(&nodes(), &json!({"https://example.org/q": [{}]}), false);
        assert_eq!(framed.len(), 1);
        assert_eq!(framed[0]["@id"], "https://example.org/c");
    }

    #[test]
    fn empty_frames_match_everything() {
        assert_eq!(select(&nodes(), &json!({}), false).len(), 3);
        assert_eq!(select(&nodes(), &json!({}), true).len(), 1);
    }

    #[test]
    fn cycles_embed_once() {
        let nodes = vec![
            json!({"@id": "https://example.org/a", "https://example.org/next": [{"@id": "https://example.org/b"}]}),
            json!({"@id": "https://example.org/b", "https://example.org/next": [{"@id": "https://example.org/a"}]}),
        ];
        let framed = select(&nodes, &json!({"@id": ["https://example.org/a"]}), false);
        assert_eq!(
            framed[0]["https://example.org/next"][0]["https://example.org/next"][0],
            json!({"@id": "https://example.org/a"})
        );
    }
}
