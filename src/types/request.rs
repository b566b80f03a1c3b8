//! Request descriptors.
//!
//! [`RequestConfig`] is the fully resolved descriptor of one call. Request
//! interceptors see it and may answer with a [`RequestPatch`], which is
//! shallow-merged back in. [`RequestOptions`] is the second argument of a
//! terminal call.

use super::body::{Body, Field};
use super::http::FetchOptions;
use super::method::Method;
use crate::error::TreatyError;
use crate::execution::http::headers::{HeaderSource, Headers, resolve_headers};
use serde_json::{Map, Value};

/// Resolved descriptor for one call.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Domain, joined path and query string.
    pub url: String,
    /// Lowercased header names.
    pub headers: Headers,
    pub body: Option<Body>,
    /// Transport passthrough options.
    pub fetch: FetchOptions,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            fetch: FetchOptions::default(),
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Merge a patch returned by a request interceptor.
    ///
    /// Fields present in the patch replace the current ones, except headers,
    /// which are resolved on top of the current headers, and transport
    /// options, which are merged field by field.
    pub fn apply(mut self, patch: RequestPatch, path: &str) -> Self {
        if patch.headers.is_some() {
            let headers =
                resolve_headers(patch.headers.as_ref(), path, &self, self.headers.clone());
            self.headers = headers;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(body) = patch.body {
            self.body = Some(body);
        }
        if let Some(fetch) = patch.fetch {
            self.fetch = self.fetch.merge(&fetch);
        }
        self
    }
}

/// Partial config returned by a request interceptor.
#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    pub method: Option<Method>,
    pub url: Option<String>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Body>,
    pub fetch: Option<FetchOptions>,
}

impl RequestPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add one header; repeated calls accumulate.
    pub fn with_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers(HeaderSource::pair(key, value))
    }

    /// Add a header source after any already set on the patch.
    pub fn with_headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        let headers = headers.into();
        self.headers = Some(match self.headers.take() {
            Some(existing) => existing.and(headers),
            None => headers,
        });
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = Some(fetch);
        self
    }
}

/// Second argument of a terminal call.
///
/// GET, HEAD and SUBSCRIBE take no options argument; the same three keys are
/// read from their body instead (see [`RequestOptions::from_body`]).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters, encoded in insertion order.
    pub query: Option<Map<String, Value>>,
    pub headers: Option<HeaderSource>,
    pub fetch: Option<FetchOptions>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = Some(query);
        self
    }

    /// Add one query parameter. Arrays repeat the key once per element.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers(HeaderSource::pair(key, value))
    }

    pub fn with_headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        let headers = headers.into();
        self.headers = Some(match self.headers.take() {
            Some(existing) => existing.and(headers),
            None => headers,
        });
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// The `query` object of a bodyless call's body, if any.
    pub fn query_from_body(body: Option<&Body>) -> Option<Map<String, Value>> {
        match body?.get("query").and_then(Field::as_value) {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }

    /// Read `query`, `headers` and `fetch` out of the body of a bodyless call.
    ///
    /// Only object bodies are inspected. A `query` that is not an object is
    /// ignored; a `fetch` that does not deserialize is an error.
    pub fn from_body(body: Option<&Body>) -> Result<Self, TreatyError> {
        let Some(body @ Body::Object(_)) = body else {
            return Ok(Self::default());
        };

        let query = Self::query_from_body(Some(body));
        let headers = body
            .get("headers")
            .and_then(Field::as_value)
            .and_then(HeaderSource::from_json);
        let fetch = body
            .get("fetch")
            .and_then(Field::as_value)
            .filter(|v| !v.is_null())
            .map(|v| serde_json::from_value::<FetchOptions>(v.clone()))
            .transpose()?;

        Ok(Self {
            query,
            headers,
            fetch,
        })
    }
}
