//! Deprecated-field discovery.
//!
//! A field is deprecated when its schema carries `"deprecated": true` or
//! its description mentions "deprecated" in any case. Paths use `.` between
//! properties, `[]` for array items and `*` for map values:
//! `auth.sasl.mechanism`, `brokers[]`, `headers.*`.

use serde_json::Value;

/// Paths of every deprecated field below `schema`, properties visited in
/// sorted key order.
pub fn deprecated_fields(schema: &Value) -> Vec<String> {
    let mut found = Vec::new();
    walk(schema, "", &mut found);
    found
}

fn walk(node: &Value, path: &str, found: &mut Vec<String>) {
    if let Some(properties) = node.get("properties").and_then(Value::as_object) {
        let mut keys: Vec<&String> = properties.keys().collect();
        keys.sort();
        for key in keys {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            visit(&properties[key.as_str()], child_path, found);
        }
    }
    if let Some(items) = node.get("items").filter(|v| v.is_object()) {
        visit(items, format!("{path}[]"), found);
    }
    if let Some(values) = node.get("additionalProperties").filter(|v| v.is_object()) {
        let child_path = if path.is_empty() {
            "*".to_string()
        } else {
            format!("{path}.*")
        };
        visit(values, child_path, found);
    }
}

fn visit(node: &Value, path: String, found: &mut Vec<String>) {
    if is_deprecated(node) {
        found.push(path.clone());
    }
    walk(node, &path, found);
}

fn is_deprecated(node: &Value) -> bool {
    if node.get("deprecated").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    node.get("description")
        .and_then(Value::as_str)
        .is_some_and(|d| d.to_lowercase().contains("deprecated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finds_nested_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "topic": {"type": "string", "description": "Deprecated: use traces.topic."},
                "auth": {
                    "type": "object",
                    "properties": {
                        "plain_text": {"type": "object", "deprecated": true},
                        "sasl": {"type": "object"}
                    }
                },
                "brokers": {
                    "type": "array",
                    "items": {"type": "string", "description": "DEPRECATED broker address"}
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": {"type": "string", "description": "deprecated header"}
                }
            }
        });
        assert_eq!(
            deprecated_fields(&schema),
            vec!["auth.plain_text", "brokers[]", "headers.*", "topic"]
        );
    }

    #[test]
    fn test_deprecated_false_and_plain_descriptions_ignored() {
        let schema = json!({
            "properties": {
                "a": {"deprecated": false},
                "b": {"description": "Current setting."},
                "c": {"additionalProperties": true}
            }
        });
        assert!(deprecated_fields(&schema).is_empty());
    }
}
