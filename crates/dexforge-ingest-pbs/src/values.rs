//! Value coercions shared by the converters.

use serde_json::{Map, Value};

/// `"45, 49,49"` → `["45", "49", "49"]` (blank entries kept).
pub(crate) fn comma_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(|v| Value::String(v.trim().to_string()))
            .collect(),
    )
}

/// Like [`comma_list`] but blank entries are dropped.
pub(crate) fn token_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Value::String(v.to_string()))
            .collect(),
    )
}

pub(crate) fn int_or_text(context: &str, key: &str, raw: &str) -> Value {
    match raw.trim().parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => {
            tracing::warn!(record = %context, key, value = raw, "expected an integer; keeping text");
            Value::String(raw.to_string())
        }
    }
}

pub(crate) fn float_or_text(context: &str, key: &str, raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        Ok(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Err(_) => {
            tracing::warn!(record = %context, key, value = raw, "expected a number; keeping text");
            Value::String(raw.to_string())
        }
    }
}

/// `Types = A,B` → `Type1 = A`, `Type2 = B` (Type2 only when present).
pub(crate) fn split_types(out: &mut Map<String, Value>, raw: &str) {
    let mut types = raw.split(',').map(str::trim).filter(|t| !t.is_empty());
    if let Some(first) = types.next() {
        out.insert("Type1".to_string(), Value::String(first.to_string()));
    }
    if let Some(second) = types.next() {
        out.insert("Type2".to_string(), Value::String(second.to_string()));
    }
}

/// Text form of a JSON value for comparisons: strings unquoted, lists joined.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
