//! Response types.
//!
//! [`RawResponse`] is what a transport hands back and what response
//! interceptors observe. [`TreatyResponse`] is the normalized result of a
//! call: exactly one of `data` and `error` is set.

use crate::error::{FetchError, TreatyError};
use crate::execution::http::headers::Headers;
use crate::streaming::{EventStream, StreamHandle};
use bytes::Bytes;
use serde_json::{Map, Value};

/// Body of a [`RawResponse`], as buffered (or not) by the transport.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Empty,
    /// Body that already parsed as JSON.
    Json(Value),
    Text(String),
    Bytes(Bytes),
    /// Multipart container, flattened to field name and value.
    Form(Map<String, Value>),
    /// Unbuffered body, consumed at most once.
    Streaming(StreamHandle),
}

/// Parameterless, lowercased `content-type` of lowercased headers. Empty
/// when absent.
pub fn media_type(headers: &Headers) -> String {
    headers
        .get("content-type")
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Response as received from the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    /// Lowercased header names.
    pub headers: Headers,
    pub url: String,
    pub body: ResponseBody,
}

impl RawResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self {
            status,
            status_text: http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            headers: Headers::new(),
            url: String::new(),
            body,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Media type without parameters, lowercased. Empty when absent.
    pub fn content_type(&self) -> String {
        media_type(&self.headers)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Decoded payload of a response.
#[derive(Debug)]
pub enum Data {
    Value(Value),
    Bytes(Bytes),
    Form(Map<String, Value>),
    Stream(EventStream),
}

impl Data {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// JSON view of the payload. Bytes are decoded lossily as UTF-8 text,
    /// forms become objects and event streams become `null`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(v) => v,
            Self::Bytes(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
            Self::Form(map) => Value::Object(map),
            Self::Stream(_) => Value::Null,
        }
    }

    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, TreatyError> {
        Ok(serde_json::from_value(self.into_value())?)
    }

    pub fn into_stream(self) -> Option<EventStream> {
        match self {
            Self::Stream(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for Data {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// Normalized result of a call.
#[derive(Debug)]
pub struct TreatyResponse {
    pub data: Option<Data>,
    pub error: Option<FetchError>,
    pub response: RawResponse,
    pub status: u16,
    pub headers: Headers,
}

impl TreatyResponse {
    pub fn new(response: RawResponse, data: Option<Data>, error: Option<FetchError>) -> Self {
        Self {
            data,
            error,
            status: response.status,
            headers: response.headers.clone(),
            response,
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Option<Data>, FetchError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }

    /// Deserialize the data, or return the fetch error.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, TreatyError> {
        match self.into_result()? {
            Some(data) => data.json(),
            None => Ok(serde_json::from_value(Value::Null)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_drops_parameters() {
        let r = RawResponse::new(200, ResponseBody::Empty)
            .with_header("Content-Type", "Application/JSON; charset=utf-8");
        assert_eq!(r.content_type(), "application/json");
        assert_eq!(RawResponse::new(204, ResponseBody::Empty).content_type(), "");
    }

    #[test]
    fn status_text_defaults_to_canonical_reason() {
        assert_eq!(RawResponse::new(404, ResponseBody::Empty).status_text, "Not Found");
        assert_eq!(RawResponse::new(599, ResponseBody::Empty).status_text, "");
    }

    #[test]
    fn into_result_returns_exactly_one_side() {
        let ok = TreatyResponse::new(
            RawResponse::new(200, ResponseBody::Empty),
            Some(Data::Value(json!({"id": 1}))),
            None,
        );
        assert_eq!(ok.status, 200);
        let data = ok.into_result().unwrap().unwrap();
        assert_eq!(data.as_value(), Some(&json!({"id": 1})));

        let err = TreatyResponse::new(
            RawResponse::new(404, ResponseBody::Empty),
            None,
            Some(FetchError::new(404, json!({"msg": "not found"}))),
        );
        assert!(!err.is_ok());
        assert_eq!(err.into_result().unwrap_err().status, 404);
    }

    #[test]
    fn typed_json_from_data() {
        #[derive(serde::Deserialize)]
        struct User {
            id: u32,
        }
        let r = TreatyResponse::new(
            RawResponse::new(200, ResponseBody::Empty),
            Some(Data::Value(json!({"id": 7}))),
            None,
        );
        let user: User = r.json().unwrap();
        assert_eq!(user.id, 7);
    }

    #[test]
    fn data_into_value() {
        assert_eq!(Data::Bytes(Bytes::from_static(b"hi")).into_value(), json!("hi"));
        assert_eq!(Data::Stream(EventStream::empty()).into_value(), Value::Null);
        let mut form = Map::new();
        form.insert("a".into(), json!("1"));
        assert_eq!(Data::Form(form).into_value(), json!({"a": "1"}));
    }
}
