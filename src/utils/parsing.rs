//! Best-effort parsing of stringified values.
//!
//! Response bodies and stream chunks arrive as text even when they encode a
//! number, a boolean or a JSON document. [`parse_stringified_value`] recovers
//! the structured value and falls back to the raw text.

use serde_json::Value;

/// Parse `text` into a structured value, or return it unchanged as a string.
///
/// Never fails: anything that does not parse cleanly comes back as
/// `Value::String` holding the original (untrimmed) text.
pub fn parse_stringified_value(text: &str) -> Value {
    let trimmed = text.trim();

    match trimmed {
        "" => return Value::String(text.to_string()),
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    if (looks_numeric(trimmed) || looks_structured(trimmed))
        && let Ok(v) = serde_json::from_str::<Value>(trimmed)
    {
        return v;
    }

    Value::String(text.to_string())
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
}

fn looks_structured(s: &str) -> bool {
    (s.starts_with('{') && s.ends_with('}'))
        || (s.starts_with('[') && s.ends_with(']'))
        || (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_stringified_value("true"), json!(true));
        assert_eq!(parse_stringified_value(" false "), json!(false));
        assert_eq!(parse_stringified_value("null"), Value::Null);
        assert_eq!(parse_stringified_value("42"), json!(42));
        assert_eq!(parse_stringified_value("-1.5"), json!(-1.5));
        assert_eq!(parse_stringified_value("1e3"), json!(1000.0));
    }

    #[test]
    fn parses_json_documents() {
        assert_eq!(
            parse_stringified_value(r#"{"a":[1,2],"b":"x"}"#),
            json!({"a": [1, 2], "b": "x"})
        );
        assert_eq!(parse_stringified_value("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_stringified_value(r#""quoted""#), json!("quoted"));
    }

    #[test]
    fn falls_back_to_raw_text() {
        assert_eq!(parse_stringified_value("hello"), json!("hello"));
        assert_eq!(parse_stringified_value("{not json}"), json!("{not json}"));
        assert_eq!(parse_stringified_value("007"), json!("007"));
        assert_eq!(parse_stringified_value("1.2.3"), json!("1.2.3"));
        assert_eq!(parse_stringified_value("  "), json!("  "));
        assert_eq!(parse_stringified_value(" padded "), json!(" padded "));
    }
}
