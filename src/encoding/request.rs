//! Request body encoding.
//!
//! Exactly one branch applies, in this order: a body with a top-level file
//! becomes multipart, any other object (or array) becomes JSON, a scalar is
//! sent as plain text, and `null` or no body sends nothing.

use crate::error::TreatyError;
use crate::types::{Body, Field, FileLike};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

pub const CONTENT_TYPE_MULTIPART: &str = "multipart/form-data";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// One appended multipart value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File(FileLike),
}

/// Multipart fields in append order; a key repeats once per list element.
pub type MultipartPayload = Vec<(String, FormPart)>;

/// Wire-ready body.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedBody {
    Multipart(MultipartPayload),
    Json(Value),
    Text(String),
}

impl EncodedBody {
    /// Content type announced for this body.
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Multipart(_) => CONTENT_TYPE_MULTIPART,
            Self::Json(_) => CONTENT_TYPE_JSON,
            Self::Text(_) => CONTENT_TYPE_TEXT,
        }
    }

    /// JSON rendering handed to in-process handlers. Text becomes a JSON
    /// string literal; multipart becomes an object whose files are described
    /// by name, type, size and modification time.
    pub fn to_json_string(&self) -> Result<String, TreatyError> {
        let value = match self {
            Self::Json(v) => v.clone(),
            Self::Text(s) => Value::String(s.clone()),
            Self::Multipart(parts) => {
                let mut map = Map::new();
                for (key, part) in parts {
                    let rendered = match part {
                        FormPart::Text(s) => Value::String(s.clone()),
                        FormPart::File(f) => f.describe(),
                    };
                    match map.get_mut(key) {
                        Some(Value::Array(items)) => items.push(rendered),
                        Some(existing) => {
                            let first = existing.take();
                            *existing = Value::Array(vec![first, rendered]);
                        }
                        None => {
                            map.insert(key.clone(), rendered);
                        }
                    }
                }
                Value::Object(map)
            }
        };
        Ok(serde_json::to_string(&value)?)
    }
}

/// Pick the encoding branch for `body`.
pub fn encode_body(body: Option<&Body>) -> Result<Option<EncodedBody>, TreatyError> {
    let Some(body) = body else {
        return Ok(None);
    };

    if body.has_file() {
        return Ok(Some(EncodedBody::Multipart(encode_multipart(body))));
    }

    match body {
        Body::Object(_) => Ok(Some(EncodedBody::Json(body.to_json()?))),
        Body::Json(Value::Null) => Ok(None),
        Body::Json(v) => Ok(Some(EncodedBody::Json(v.clone()))),
        Body::Scalar(Value::String(s)) => Ok(Some(EncodedBody::Text(s.clone()))),
        Body::Scalar(v) => Ok(Some(EncodedBody::Text(v.to_string()))),
    }
}

fn encode_multipart(body: &Body) -> MultipartPayload {
    let mut parts = MultipartPayload::new();
    let Body::Object(fields) = body else {
        return parts;
    };

    for (key, field) in fields {
        match field {
            Field::List(items) => {
                for item in items {
                    parts.push((key.clone(), to_form_part(item)));
                }
            }
            other => parts.push((key.clone(), to_form_part(other))),
        }
    }
    parts
}

fn to_form_part(field: &Field) -> FormPart {
    match field {
        Field::File(f) => FormPart::File(f.fresh_copy()),
        Field::Value(Value::String(s)) => FormPart::Text(s.clone()),
        Field::Value(v) => FormPart::Text(v.to_string()),
        list @ Field::List(_) => {
            FormPart::Text(serde_json::to_string(list).unwrap_or_default())
        }
    }
}

/// Build the reqwest multipart form for a payload.
pub fn to_reqwest_form(payload: &MultipartPayload) -> Result<Form, TreatyError> {
    let mut form = Form::new();
    for (key, part) in payload {
        form = match part {
            FormPart::Text(s) => form.text(key.clone(), s.clone()),
            FormPart::File(f) => {
                let part = Part::bytes(f.content().to_vec())
                    .file_name(f.name().to_string())
                    .mime_str(f.content_type())
                    .map_err(|e| {
                        TreatyError::InvalidHeader(format!(
                            "Invalid content type '{}' for file '{}': {e}",
                            f.content_type(),
                            f.name()
                        ))
                    })?;
                form.part(key.clone(), part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_bodies_are_json() {
        let body = Body::from(json!({"name": "x", "tags": ["a"]}));
        let encoded = encode_body(Some(&body)).unwrap().unwrap();
        assert_eq!(encoded.content_type(), CONTENT_TYPE_JSON);
        assert_eq!(encoded, EncodedBody::Json(json!({"name": "x", "tags": ["a"]})));
    }

    #[test]
    fn arrays_are_json_and_scalars_are_text() {
        let arr = encode_body(Some(&Body::from(json!([1, 2])))).unwrap().unwrap();
        assert_eq!(arr, EncodedBody::Json(json!([1, 2])));

        let text = encode_body(Some(&Body::from("hello"))).unwrap().unwrap();
        assert_eq!(text, EncodedBody::Text("hello".into()));
        assert_eq!(text.content_type(), CONTENT_TYPE_TEXT);

        let num = encode_body(Some(&Body::from(json!(12)))).unwrap().unwrap();
        assert_eq!(num, EncodedBody::Text("12".into()));
    }

    #[test]
    fn null_and_absent_bodies_send_nothing() {
        assert!(encode_body(None).unwrap().is_none());
        assert!(encode_body(Some(&Body::from(json!(null)))).unwrap().is_none());
    }

    #[test]
    fn files_switch_to_multipart_and_expand_lists() {
        let a = FileLike::new("a.txt", "aaa").with_content_type("text/plain");
        let b = FileLike::new("b.bin", vec![0u8, 1, 2]);
        let body = Body::object()
            .field("title", "hello")
            .field("count", json!(2))
            .field("files", vec![a.clone(), b.clone()]);

        let encoded = encode_body(Some(&body)).unwrap().unwrap();
        assert_eq!(encoded.content_type(), CONTENT_TYPE_MULTIPART);
        let EncodedBody::Multipart(parts) = encoded else {
            panic!("expected multipart");
        };
        assert_eq!(
            parts,
            vec![
                ("title".to_string(), FormPart::Text("hello".into())),
                ("count".to_string(), FormPart::Text("2".into())),
                ("files".to_string(), FormPart::File(a)),
                ("files".to_string(), FormPart::File(b)),
            ]
        );
    }

    #[test]
    fn multipart_renders_as_json_for_handlers() {
        let file = FileLike::new("a.txt", "abc").with_content_type("text/plain");
        let body = Body::object()
            .field("name", "n")
            .field("docs", vec![file.clone(), file]);
        let encoded = encode_body(Some(&body)).unwrap().unwrap();
        let rendered: Value = serde_json::from_str(&encoded.to_json_string().unwrap()).unwrap();
        assert_eq!(rendered["name"], json!("n"));
        assert_eq!(rendered["docs"][1]["name"], json!("a.txt"));
        assert_eq!(rendered["docs"][0]["size"], json!(3));
    }

    #[test]
    fn text_renders_as_json_string_literal() {
        let encoded = EncodedBody::Text("hi".into());
        assert_eq!(encoded.to_json_string().unwrap(), "\"hi\"");
    }

    #[test]
    fn reqwest_form_accepts_payload() {
        let payload = vec![
            ("a".to_string(), FormPart::Text("1".into())),
            (
                "f".to_string(),
                FormPart::File(FileLike::new("x.txt", "x").with_content_type("text/plain")),
            ),
        ];
        assert!(to_reqwest_form(&payload).is_ok());

        let bad = vec![(
            "f".to_string(),
            FormPart::File(FileLike::new("x", "x").with_content_type("not a mime")),
        )];
        assert!(matches!(to_reqwest_form(&bad), Err(TreatyError::InvalidHeader(_))));
    }
}
