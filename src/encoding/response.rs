//! Response buffering and decoding.
//!
//! Transports buffer bodies with [`buffer_body`]; the pipeline turns a
//! [`RawResponse`] into data or a [`FetchError`] with [`decode_response`].
//! Decoding only reads the response, so decoding a buffered response twice
//! gives the same outcome.

use crate::error::FetchError;
use crate::streaming::EventStream;
use crate::types::{Data, RawResponse, ResponseBody};
use crate::utils::parse_stringified_value;
use bytes::Bytes;
use serde_json::{Map, Value};

pub const EVENT_STREAM: &str = "text/event-stream";
pub const JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const MULTIPART: &str = "multipart/form-data";

/// Buffer raw bytes according to the (parameterless) content type.
///
/// JSON that fails to parse is kept as text. Multipart bodies are kept as
/// bytes, since only a parsed container decodes into fields.
pub fn buffer_body(content_type: &str, bytes: Bytes) -> ResponseBody {
    if bytes.is_empty() {
        return ResponseBody::Empty;
    }

    match content_type {
        JSON => match serde_json::from_slice::<Value>(&bytes) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => text_or_bytes(bytes),
        },
        OCTET_STREAM | MULTIPART => ResponseBody::Bytes(bytes),
        _ => text_or_bytes(bytes),
    }
}

/// Buffer a body by trying JSON first, whatever the content type says.
pub fn buffer_body_json_first(content_type: &str, bytes: Bytes) -> ResponseBody {
    if bytes.is_empty() {
        return ResponseBody::Empty;
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(v) => ResponseBody::Json(v),
        Err(_) => buffer_body(content_type, bytes),
    }
}

fn text_or_bytes(bytes: Bytes) -> ResponseBody {
    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => ResponseBody::Text(s),
        Err(_) => ResponseBody::Bytes(bytes),
    }
}

/// Decode a body by content type.
pub fn decode_body(content_type: &str, body: &ResponseBody) -> Data {
    match content_type {
        EVENT_STREAM => Data::Stream(event_stream(body)),
        JSON | OCTET_STREAM => raw(body),
        MULTIPART => match body {
            ResponseBody::Form(fields) => Data::Form(fields.clone()),
            _ => Data::Form(Map::new()),
        },
        _ => match body {
            ResponseBody::Text(text) => Data::Value(parse_stringified_value(text)),
            other => raw(other),
        },
    }
}

/// Decode a response and apply the status check.
///
/// Statuses outside `[200, 300)` move the decoded payload into a
/// [`FetchError`] and leave no data.
pub fn decode_response(response: &RawResponse) -> (Option<Data>, Option<FetchError>) {
    let data = decode_body(&response.content_type(), &response.body);
    check_status(response.status, data)
}

pub fn check_status(status: u16, data: Data) -> (Option<Data>, Option<FetchError>) {
    if (200..300).contains(&status) {
        (Some(data), None)
    } else {
        (None, Some(FetchError::new(status, data.into_value())))
    }
}

fn raw(body: &ResponseBody) -> Data {
    match body {
        ResponseBody::Empty => Data::Value(Value::Null),
        ResponseBody::Json(v) => Data::Value(v.clone()),
        ResponseBody::Text(s) => Data::Value(Value::String(s.clone())),
        ResponseBody::Bytes(b) => Data::Bytes(b.clone()),
        ResponseBody::Form(fields) => Data::Form(fields.clone()),
        ResponseBody::Streaming(handle) => match handle.take() {
            Some(stream) => Data::Stream(EventStream::from_bytes(stream)),
            None => Data::Stream(EventStream::empty()),
        },
    }
}

fn event_stream(body: &ResponseBody) -> EventStream {
    match body {
        ResponseBody::Streaming(handle) => match handle.take() {
            Some(stream) => EventStream::from_bytes(stream),
            None => EventStream::empty(),
        },
        ResponseBody::Text(text) if !text.is_empty() => EventStream::from_text(text.clone()),
        ResponseBody::Bytes(b) if !b.is_empty() => {
            EventStream::from_text(String::from_utf8_lossy(b).into_owned())
        }
        ResponseBody::Json(v) => EventStream::from_value(v.clone()),
        _ => EventStream::empty(),
    }
}
