//! Loosely-typed access helpers over a workflow document.
//!
//! Workflow documents arrive as arbitrary JSON. They are inspected through
//! `serde_json::Value` rather than deserialized into strict structs so that a
//! shape violation becomes an accumulated issue instead of a parse abort.

use serde_json::{Map, Value};

/// The node's `name`, if present and a string.
pub fn node_name(node: &Value) -> Option<&str> {
    node.get("name").and_then(Value::as_str)
}

/// The node's `id`, if present and a string.
pub fn node_id(node: &Value) -> Option<&str> {
    node.get("id").and_then(Value::as_str)
}

/// The node's `type` string, if present.
pub fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

/// The node's `typeVersion`, if present and numeric.
pub fn node_type_version(node: &Value) -> Option<f64> {
    node.get("typeVersion").and_then(Value::as_f64)
}

/// The node's `parameters` object, if present and an object.
pub fn node_parameters(node: &Value) -> Option<&Map<String, Value>> {
    node.get("parameters").and_then(Value::as_object)
}

/// The document's `nodes` array, if present and an array.
pub fn document_nodes(document: &Value) -> Option<&Vec<Value>> {
    document.get("nodes").and_then(Value::as_array)
}

/// The document's `connections` map, if present and an object.
pub fn document_connections(document: &Value) -> Option<&Map<String, Value>> {
    document.get("connections").and_then(Value::as_object)
}

/// Split a `prefix.nodeName` type string into its two halves.
pub fn split_type(type_str: &str) -> Option<(&str, &str)> {
    let (prefix, name) = type_str.rsplit_once('.')?;
    if prefix.is_empty() || name.is_empty() {
        return None;
    }
    Some((prefix, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_type_requires_both_halves() {
        assert_eq!(
            split_type("n8n-nodes-base.slack"),
            Some(("n8n-nodes-base", "slack"))
        );
        assert_eq!(
            split_type("@n8n/n8n-nodes-langchain.agent"),
            Some(("@n8n/n8n-nodes-langchain", "agent"))
        );
        assert_eq!(split_type("slack"), None);
        assert_eq!(split_type(".slack"), None);
        assert_eq!(split_type("pkg."), None);
    }

    #[test]
    fn accessors_tolerate_missing_fields() {
        let node = json!({ "name": "A" });
        assert_eq!(node_name(&node), Some("A"));
        assert_eq!(node_type(&node), None);
        assert_eq!(node_type_version(&node), None);
        assert!(node_parameters(&node).is_none());
    }
}
