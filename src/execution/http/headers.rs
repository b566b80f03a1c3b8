//! HTTP Headers Utility
//!
//! Header sources come in several shapes (maps, pairs, nested lists, header
//! maps, callbacks). [`resolve_headers`] flattens any of them into a plain
//! mapping with lowercased keys; later sources overwrite earlier ones.

use crate::error::TreatyError;
use crate::types::RequestConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Resolved headers: lowercased keys, one value each.
pub type Headers = HashMap<String, String>;

/// Callback computing headers from the request path and the config built so far.
pub type HeaderFn = dyn Fn(&str, &RequestConfig) -> Option<HeaderSource> + Send + Sync;

/// Anything that can produce headers.
#[derive(Clone)]
pub enum HeaderSource {
    /// Key/value entries, applied in order.
    Map(Vec<(String, String)>),
    /// A single `[key, value]` pair.
    Pair(String, String),
    /// Nested sources, resolved in order.
    List(Vec<HeaderSource>),
    HeaderMap(HeaderMap),
    /// Computed per call; the returned source is resolved in turn.
    Dynamic(Arc<HeaderFn>),
}

impl HeaderSource {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&str, &RequestConfig) -> Option<HeaderSource> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pair(key.into(), value.into())
    }

    /// Read headers out of a JSON value: objects become maps (non-string values
    /// in their JSON form), arrays become lists of `[key, value]` pairs or
    /// nested objects. Anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_header_value(v)))
                    .collect(),
            )),
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Array(pair) => match (pair.first(), pair.get(1)) {
                            (Some(Value::String(k)), Some(v)) => {
                                Some(Self::Pair(k.clone(), json_header_value(v)))
                            }
                            _ => None,
                        },
                        other => Self::from_json(other),
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Append another source after this one.
    pub fn and(self, other: HeaderSource) -> Self {
        match self {
            Self::List(mut items) => {
                items.push(other);
                Self::List(items)
            }
            first => Self::List(vec![first, other]),
        }
    }
}

fn json_header_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Debug for HeaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Pair(k, v) => f.debug_tuple("Pair").field(k).field(v).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::HeaderMap(map) => f.debug_tuple("HeaderMap").field(map).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<HashMap<String, String>> for HeaderSource {
    fn from(map: HashMap<String, String>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for HeaderSource {
    fn from(entries: Vec<(K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for HeaderSource {
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(map: HeaderMap) -> Self {
        Self::HeaderMap(map)
    }
}

/// Resolve `source` on top of `headers`.
///
/// Keys are lowercased on insertion; a key already present is overwritten.
/// Dynamic sources are called with `path` and `config` and their result is
/// resolved recursively. `None` leaves `headers` unchanged.
pub fn resolve_headers(
    source: Option<&HeaderSource>,
    path: &str,
    config: &RequestConfig,
    mut headers: Headers,
) -> Headers {
    let Some(source) = source else {
        return headers;
    };

    match source {
        HeaderSource::Map(entries) => {
            for (k, v) in entries {
                headers.insert(k.to_lowercase(), v.clone());
            }
            headers
        }
        HeaderSource::Pair(k, v) => {
            headers.insert(k.to_lowercase(), v.clone());
            headers
        }
        HeaderSource::List(items) => items.iter().fold(headers, |acc, item| {
            resolve_headers(Some(item), path, config, acc)
        }),
        HeaderSource::HeaderMap(map) => {
            for (k, v) in map {
                if let Ok(v) = v.to_str() {
                    headers.insert(k.as_str().to_lowercase(), v.to_string());
                }
            }
            headers
        }
        HeaderSource::Dynamic(f) => {
            let computed = f(path, config);
            resolve_headers(computed.as_ref(), path, config, headers)
        }
    }
}

/// Build a `HeaderMap` from resolved headers.
pub fn to_header_map(headers: &Headers) -> Result<HeaderMap, TreatyError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| TreatyError::InvalidHeader(format!("Invalid header name '{k}': {e}")))?;
        let value = HeaderValue::from_str(v).map_err(|e| {
            TreatyError::InvalidHeader(format!("Invalid header value for '{k}': {e}"))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Convert a `HeaderMap` to plain headers. Invalid UTF-8 values are dropped.
pub fn headermap_to_hashmap(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect()
}
