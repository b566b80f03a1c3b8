//! Request body model.
//!
//! A body is either an ordered object of fields (which may hold files), a
//! non-object JSON value, or a scalar. Files only count when they sit at the
//! top level of an object body, directly or inside a list.

use crate::error::TreatyError;
use crate::utils::mime::guess_mime;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Value, json};
use std::path::Path;

/// Ordered field map of an object body.
pub type Fields = IndexMap<String, Field>;

/// In-memory file with the metadata a multipart part needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLike {
    name: String,
    content_type: String,
    last_modified: Option<DateTime<Utc>>,
    content: Bytes,
}

impl FileLike {
    /// Build a file from bytes, guessing the content type from the bytes and
    /// then from the name.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content = content.into();
        let content_type = guess_mime(Some(content.as_ref()), Some(name.as_str()));
        Self {
            name,
            content_type,
            last_modified: None,
            content,
        }
    }

    /// Read a file from disk. Name and modification time come from the path
    /// and its metadata.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TreatyError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let modified = tokio::fs::metadata(path)
            .await?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let content_type =
            guess_mime(Some(content.as_slice()), Some(path.to_string_lossy().as_ref()));

        Ok(Self {
            name,
            content_type,
            last_modified: modified,
            content: Bytes::from(content),
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// A new file built from this file's bytes and metadata, so appending it
    /// never shares state with the caller's value.
    pub fn fresh_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            last_modified: self.last_modified,
            content: Bytes::copy_from_slice(&self.content),
        }
    }

    /// JSON description used wherever a file has to be rendered as JSON.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.content_type,
            "size": self.size(),
            "lastModified": self.last_modified.map(|t| t.timestamp_millis()),
        })
    }
}

/// One value of an object body.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Value(Value),
    File(FileLike),
    List(Vec<Field>),
}

impl Field {
    /// File capability predicate.
    pub const fn is_file_like(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// True for a file or a list holding at least one file.
    pub fn contains_file(&self) -> bool {
        match self {
            Self::File(_) => true,
            Self::List(items) => items.iter().any(Field::is_file_like),
            Self::Value(_) => false,
        }
    }

    /// Render as a path segment. Strings are used as-is, other JSON values in
    /// their JSON form, files by name, lists comma-joined.
    pub fn to_segment(&self) -> String {
        match self {
            Self::Value(Value::String(s)) => s.clone(),
            Self::Value(v) => v.to_string(),
            Self::File(f) => f.name.clone(),
            Self::List(items) => items
                .iter()
                .map(Field::to_segment)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::File(f) => f.describe().serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<Value> for Field {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<FileLike> for Field {
    fn from(f: FileLike) -> Self {
        Self::File(f)
    }
}

impl From<Vec<FileLike>> for Field {
    fn from(files: Vec<FileLike>) -> Self {
        Self::List(files.into_iter().map(Field::File).collect())
    }
}

impl From<Vec<Field>> for Field {
    fn from(items: Vec<Field>) -> Self {
        Self::List(items)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Self::Value(Value::String(s.to_string()))
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self::Value(Value::String(s))
    }
}

/// First argument of a terminal call.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Object with ordered fields; the only shape that may carry files.
    Object(Fields),
    /// Arrays and `null`.
    Json(Value),
    /// Strings, numbers and booleans.
    Scalar(Value),
}

impl Body {
    /// Empty object body, to be filled with [`Body::field`].
    pub fn object() -> Self {
        Self::Object(Fields::new())
    }

    /// Insert a field. A non-object body is replaced by an object holding
    /// only this field.
    pub fn field(self, key: impl Into<String>, value: impl Into<Field>) -> Self {
        let mut fields = match self {
            Self::Object(fields) => fields,
            _ => Fields::new(),
        };
        fields.insert(key.into(), value.into());
        Self::Object(fields)
    }

    /// Serialize any value into a body.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, TreatyError> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Empty strings, zero, `false` and `null` count as no body at all.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Object(_) => false,
            Self::Json(v) | Self::Scalar(v) => match v {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::String(s) => s.is_empty(),
                Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
                Value::Array(_) | Value::Object(_) => false,
            },
        }
    }

    /// Own key count for object-like bodies (objects and arrays).
    pub fn key_count(&self) -> Option<usize> {
        match self {
            Self::Object(fields) => Some(fields.len()),
            Self::Json(Value::Array(items)) => Some(items.len()),
            Self::Json(Value::Object(map)) => Some(map.len()),
            _ => None,
        }
    }

    /// The first own value rendered as a path segment.
    pub fn first_segment(&self) -> Option<String> {
        match self {
            Self::Object(fields) => fields.values().next().map(Field::to_segment),
            Self::Json(Value::Array(items)) => {
                items.first().map(|v| Field::Value(v.clone()).to_segment())
            }
            Self::Json(Value::Object(map)) => {
                map.values().next().map(|v| Field::Value(v.clone()).to_segment())
            }
            _ => None,
        }
    }

    /// Top-level field lookup for object bodies.
    pub fn get(&self, key: &str) -> Option<&Field> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// True when a top-level field is a file or a list holding a file.
    pub fn has_file(&self) -> bool {
        match self {
            Self::Object(fields) => fields.values().any(Field::contains_file),
            _ => false,
        }
    }

    /// JSON rendering of the body; files are described, not embedded.
    pub fn to_json(&self) -> Result<Value, TreatyError> {
        match self {
            Self::Object(fields) => Ok(serde_json::to_value(fields)?),
            Self::Json(v) | Self::Scalar(v) => Ok(v.clone()),
        }
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self {
        match v {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Field::Value(v)))
                    .collect(),
            ),
            v @ (Value::Array(_) | Value::Null) => Self::Json(v),
            v => Self::Scalar(v),
        }
    }
}

impl From<Fields> for Body {
    fn from(fields: Fields) -> Self {
        Self::Object(fields)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Scalar(Value::String(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_objects_become_ordered_fields() {
        let body = Body::from(json!({"b": 1, "a": 2, "c": 3}));
        match &body {
            Body::Object(fields) => {
                let keys: Vec<_> = fields.keys().cloned().collect();
                assert_eq!(keys, ["b", "a", "c"]);
            }
            other => panic!("expected object body, got {other:?}"),
        }
        assert_eq!(body.key_count(), Some(3));
    }

    #[test]
    fn falsy_bodies() {
        assert!(Body::from(json!("")).is_falsy());
        assert!(Body::from(json!(0)).is_falsy());
        assert!(Body::from(json!(false)).is_falsy());
        assert!(Body::from(json!(null)).is_falsy());
        assert!(!Body::from(json!("x")).is_falsy());
        assert!(!Body::from(json!(1)).is_falsy());
        assert!(!Body::from(json!([])).is_falsy());
        assert!(!Body::object().is_falsy());
    }

    #[test]
    fn first_segment_renders_values() {
        assert_eq!(
            Body::from(json!({"id": "42"})).first_segment().as_deref(),
            Some("42")
        );
        assert_eq!(
            Body::from(json!({"id": 7})).first_segment().as_deref(),
            Some("7")
        );
        assert_eq!(
            Body::from(json!(["only"])).first_segment().as_deref(),
            Some("only")
        );
        assert_eq!(Body::from(json!("scalar")).first_segment(), None);
    }

    #[test]
    fn has_file_checks_top_level_only() {
        let file = FileLike::new("a.txt", "hello");
        assert!(Body::object().field("f", file.clone()).has_file());
        assert!(
            Body::object()
                .field("fs", vec![Field::from("x"), Field::File(file)])
                .has_file()
        );
        assert!(!Body::from(json!({"nested": {"file": "no"}})).has_file());
        assert!(!Body::from(json!("text")).has_file());
    }

    #[test]
    fn field_on_scalar_body_starts_an_object() {
        let body = Body::from("x").field("k", "v");
        assert_eq!(body.to_json().unwrap(), json!({"k": "v"}));
    }

    #[test]
    fn files_render_as_descriptions_in_json() {
        let ts = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
        let file = FileLike::new("a.txt", "hello")
            .with_content_type("text/plain")
            .with_last_modified(ts);
        let body = Body::object().field("f", file);
        assert_eq!(
            body.to_json().unwrap(),
            json!({"f": {
                "name": "a.txt",
                "type": "text/plain",
                "size": 5,
                "lastModified": 1_700_000_000_000i64
            }})
        );
    }

    #[test]
    fn fresh_copy_preserves_metadata_and_bytes() {
        let file = FileLike::new("img.png", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(file.content_type(), "image/png");
        let copy = file.fresh_copy();
        assert_eq!(copy, file);
    }

    #[tokio::test]
    async fn from_path_reads_name_bytes_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let file = FileLike::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "notes.txt");
        assert_eq!(file.content().as_ref(), b"hello");
        assert_eq!(file.content_type(), "text/plain");
        assert!(file.last_modified().is_some());
    }
}
