//! Request pipeline.
//!
//! Turns a finalized call (method, path, body, options) into a dispatched
//! request and a normalized [`TreatyResponse`]:
//!
//! 1. resolve configured headers, then per-call headers;
//! 2. build the query string and URL;
//! 3. run request interceptors, merging their patches;
//! 4. pick the body encoding and content type;
//! 5. dispatch through the transport;
//! 6. run response interceptors, then decode by content type.

use super::http::headers::{HeaderSource, Headers, resolve_headers};
use super::http::interceptor::{RequestInterceptor, ResponseInterceptor};
use super::http::query::build_query_string;
use super::http::transport::{Transport, TransportRequest};
use crate::config::TreatyConfig;
use crate::encoding::{decode_response, encode_body};
use crate::error::{FetchError, TreatyError};
use crate::types::{
    Body, Data, FetchOptions, Method, RequestConfig, RequestOptions, TreatyResponse,
};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// A finalized call waiting to be executed.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Body>,
    pub options: Option<RequestOptions>,
}

/// Everything a call needs besides its own arguments. Shared by every node
/// of one client.
#[derive(Clone)]
pub struct Pipeline {
    domain: String,
    transport: Arc<dyn Transport>,
    headers: Option<HeaderSource>,
    on_request: Vec<Arc<dyn RequestInterceptor>>,
    on_response: Vec<Arc<dyn ResponseInterceptor>>,
    fetch: FetchOptions,
}

impl Pipeline {
    pub fn new(
        domain: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: &TreatyConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            transport,
            headers: config.headers.clone(),
            on_request: config.on_request.clone(),
            on_response: config.on_response.clone(),
            fetch: config.fetch.clone(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resolve the request a call would dispatch, running request
    /// interceptors but not the transport.
    pub async fn prepare(&self, call: Call) -> Result<TransportRequest, TreatyError> {
        let Call {
            method,
            path,
            body,
            options,
        } = call;
        let bodyless = method.is_bodyless();

        let options = if bodyless {
            RequestOptions::from_body(body.as_ref())?
        } else {
            options.unwrap_or_default()
        };

        let url = format!(
            "{}{}{}",
            self.domain,
            path,
            build_query_string(options.query.as_ref())
        );

        let fetch = match &options.fetch {
            Some(per_call) => self.fetch.clone().merge(per_call),
            None => self.fetch.clone(),
        };

        let mut config = RequestConfig::new(method, url)
            .with_body(if bodyless { None } else { body })
            .with_fetch(fetch);

        let headers = resolve_headers(self.headers.as_ref(), &path, &config, Headers::new());
        config.headers = resolve_headers(options.headers.as_ref(), &path, &config, headers);

        for interceptor in &self.on_request {
            if let Some(patch) = interceptor.on_request(&path, &config).await? {
                config = config.apply(patch, &path);
            }
        }

        if bodyless {
            config.body = None;
        }

        let encoded = encode_body(config.body.as_ref())?;
        if let Some(encoded) = &encoded {
            config
                .headers
                .insert("content-type".to_string(), encoded.content_type().to_string());
        }

        Ok(TransportRequest {
            method: config.method,
            url: config.url,
            headers: config.headers,
            body: encoded,
            fetch: config.fetch,
        })
    }

    /// Execute a call end to end.
    ///
    /// `Err` means no response was produced: a request interceptor failed,
    /// the request could not be built, or the transport failed. HTTP error
    /// statuses and response interceptor failures come back as `Ok` with the
    /// error slot set.
    pub async fn execute(&self, call: Call) -> Result<TreatyResponse, TreatyError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::debug_span!(
            target: "treaty::http",
            "treaty.request",
            request_id = %request_id,
            method = %call.method,
            path = %call.path,
        );

        async move {
            let request = self.prepare(call).await?;
            tracing::debug!(
                target: "treaty::http",
                url = %request.url,
                has_body = %request.body.is_some(),
                "dispatching request"
            );

            let response = match self.transport.send(request).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(target: "treaty::http", err=%e, "transport failed");
                    return Err(e);
                }
            };
            tracing::debug!(
                target: "treaty::http",
                status = %response.status,
                content_type = %response.content_type(),
                "response received"
            );

            let (intercepted, interceptor_error) = self.run_response_interceptors(&response).await;

            if let Some(error) = interceptor_error {
                return Ok(TreatyResponse::new(response, None, Some(error)));
            }
            if let Some(data) = intercepted {
                return Ok(TreatyResponse::new(response, Some(data), None));
            }

            let (data, error) = decode_response(&response);
            Ok(TreatyResponse::new(response, data, error))
        }
        .instrument(span)
        .await
    }

    async fn run_response_interceptors(
        &self,
        response: &crate::types::RawResponse,
    ) -> (Option<Data>, Option<FetchError>) {
        for interceptor in &self.on_response {
            match interceptor.on_response(response).await {
                Ok(Some(data)) => return (Some(data), None),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(target: "treaty::http", err=%e, "response interceptor failed");
                    return (None, Some(e.into_fetch_error()));
                }
            }
        }
        (None, None)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("domain", &self.domain)
            .field("headers", &self.headers)
            .field("on_request", &self.on_request.len())
            .field("on_response", &self.on_response.len())
            .field("fetch", &self.fetch)
            .finish_non_exhaustive()
    }
}
