//! Client configuration.

use crate::defaults::LOOPBACK_HOSTS;
use crate::execution::http::headers::HeaderSource;
use crate::execution::http::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::types::{FetchOptions, HttpConfig};
use std::fmt;
use std::sync::Arc;

/// Construction options for a [`crate::Treaty`] root.
#[derive(Clone, Default)]
pub struct TreatyConfig {
    /// Client used instead of one built from `http`.
    pub http_client: Option<reqwest::Client>,
    /// Settings for the client built when `http_client` is not set.
    pub http: HttpConfig,
    /// Headers resolved first on every call.
    pub headers: Option<HeaderSource>,
    pub on_request: Vec<Arc<dyn RequestInterceptor>>,
    pub on_response: Vec<Arc<dyn ResponseInterceptor>>,
    /// Global transport options; per-call options are merged on top.
    pub fetch: FetchOptions,
    /// Use the domain verbatim: no scheme added, no trailing slash removed.
    pub keep_domain: bool,
}

impl TreatyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Add a header source after any already configured.
    pub fn with_headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        let headers = headers.into();
        self.headers = Some(match self.headers.take() {
            Some(existing) => existing.and(headers),
            None => headers,
        });
        self
    }

    pub fn with_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers(HeaderSource::pair(key, value))
    }

    /// Append a request interceptor.
    pub fn with_on_request<I: RequestInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.on_request.push(Arc::new(interceptor));
        self
    }

    /// Replace the request interceptor list.
    pub fn with_request_interceptors(
        mut self,
        interceptors: Vec<Arc<dyn RequestInterceptor>>,
    ) -> Self {
        self.on_request = interceptors;
        self
    }

    /// Append a response interceptor.
    pub fn with_on_response<I: ResponseInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.on_response.push(Arc::new(interceptor));
        self
    }

    /// Replace the response interceptor list.
    pub fn with_response_interceptors(
        mut self,
        interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    ) -> Self {
        self.on_response = interceptors;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_keep_domain(mut self, keep_domain: bool) -> Self {
        self.keep_domain = keep_domain;
        self
    }
}

impl fmt::Debug for TreatyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreatyConfig")
            .field("http_client", &self.http_client.is_some())
            .field("http", &self.http)
            .field("headers", &self.headers)
            .field("on_request", &self.on_request.len())
            .field("on_response", &self.on_response.len())
            .field("fetch", &self.fetch)
            .field("keep_domain", &self.keep_domain)
            .finish()
    }
}

/// True when `domain` mentions a loopback host literal.
pub fn is_loopback(domain: &str) -> bool {
    LOOPBACK_HOSTS.iter().any(|host| domain.contains(host))
}

/// Normalize a base address.
///
/// Without a scheme, `http://` is prefixed for loopback hosts and `https://`
/// otherwise. One trailing `/` is removed. `keep_domain` returns the input
/// unchanged.
pub fn normalize_domain(domain: &str, keep_domain: bool) -> String {
    if keep_domain {
        return domain.to_string();
    }

    let mut domain = if domain.contains("://") {
        domain.to_string()
    } else if is_loopback(domain) {
        format!("http://{domain}")
    } else {
        format!("https://{domain}")
    };

    if domain.ends_with('/') {
        domain.pop();
    }
    domain
}
