//! JSON re-serialization with a fixed 4-space indent.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Parse and re-serialize `code` with 4-space indentation, optionally sorting
/// object keys recursively. Returns `None` when `code` is not valid JSON —
/// the caller keeps the original text (or falls back to another engine).
pub fn format_json(code: &str, sort_keys: bool) -> Option<String> {
    let mut value: Value = serde_json::from_str(code).ok()?;
    if sort_keys {
        sort_value_keys(&mut value);
    }
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).ok()?;
    String::from_utf8(buf).ok()
}

/// Recursively sort object keys lexicographically.
fn sort_value_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, mut child) in entries {
                sort_value_keys(&mut child);
                map.insert(key, child);
            }
        }
        Value::Array(items) => {
            for item in items {
                sort_value_keys(item);
            }
        }
        _ => {}
    }
}
