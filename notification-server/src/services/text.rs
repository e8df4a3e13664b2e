//! Loose text coercion for request fields.
//!
//! Mobile clients send ids and tokens as numbers, strings or (from nested
//! form fields) arrays. Everything is compared and forwarded as text.

use serde_json::Value;

/// Text form of `value`, or `None` when it counts as "not supplied":
/// `null`, `false`, `0` or an empty string.
pub fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(as_text(other)),
    }
}

/// Arrays join their elements with `,` (null elements render empty) and
/// objects render as `[object Object]`.
fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(u)) => u.to_string(),
            // f64's Display drops a zero fraction: 2.0 -> "2".
            _ => n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string()),
        },
        Value::Array(items) => items.iter().map(as_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
