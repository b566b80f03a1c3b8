//! Query string construction.

use serde_json::{Map, Value};

/// Encode query parameters as `?k=v&k=v`, or an empty string when there are none.
///
/// Keys and values are percent-encoded. Arrays repeat the key once per
/// element; objects (including nested arrays) are sent as JSON text; strings
/// are sent verbatim, integral numbers without a fraction and other scalars
/// in their JSON form.
pub fn build_query_string(query: Option<&Map<String, Value>>) -> String {
    let Some(query) = query else {
        return String::new();
    };

    let mut pairs = Vec::new();
    for (key, value) in query {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push(encode_pair(key, item));
                }
            }
            other => pairs.push(encode_pair(key, other)),
        }
    }

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn encode_pair(key: &str, value: &Value) -> String {
    let value = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    };
    format!("{}={}", encode_component(key), encode_component(&value))
}

/// Integral floats are written without a fractional part (`1.0` is `1`).
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Percent-encode a component, leaving `!'()*` as they are.
fn encode_component(raw: &str) -> String {
    let encoded = urlencoding::encode(raw);
    if !encoded.contains('%') {
        return encoded.into_owned();
    }
    encoded
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}
