//! Transports.
//!
//! A [`Transport`] sends one fully resolved request and returns the raw
//! response. Any response, whatever its status, is a successful dispatch;
//! `Err` is reserved for failures that produced no response at all.
//!
//! Two implementations ship with the crate: [`ReqwestTransport`] for real
//! network calls and [`HandlerTransport`], which hands a synthesized
//! `http::Request` to an in-process [`Handler`].

use super::headers::{Headers, headermap_to_hashmap, to_header_map};
use crate::encoding::request::{CONTENT_TYPE_MULTIPART, EncodedBody, to_reqwest_form};
use crate::encoding::response::{EVENT_STREAM, buffer_body, buffer_body_json_first};
use crate::error::TreatyError;
use crate::streaming::{ByteStream, StreamHandle};
use crate::types::response::media_type;
use crate::types::{FetchOptions, Method, RawResponse, ResponseBody};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;

/// Fully resolved request handed to a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<EncodedBody>,
    pub fetch: FetchOptions,
}

/// Sends requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TreatyError>;
}

/// Network transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TreatyError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            fetch,
        } = request;

        // reqwest writes its own multipart content type, boundary included
        if matches!(body, Some(EncodedBody::Multipart(_)))
            && headers
                .get("content-type")
                .is_some_and(|ct| ct == CONTENT_TYPE_MULTIPART)
        {
            headers.remove("content-type");
        }

        let mut builder = self
            .client
            .request(method.to_http()?, &url)
            .headers(to_header_map(&headers)?);

        builder = match body {
            Some(EncodedBody::Json(v)) => builder.body(serde_json::to_vec(&v)?),
            Some(EncodedBody::Text(s)) => builder.body(s),
            Some(EncodedBody::Multipart(payload)) => builder.multipart(to_reqwest_form(&payload)?),
            None => builder,
        };

        if let Some(timeout) = fetch.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = &fetch.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some((username, password)) = &fetch.basic_auth {
            builder = builder.basic_auth(username, password.as_ref());
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = headermap_to_hashmap(response.headers());
        let final_url = response.url().to_string();
        let content_type = media_type(&headers);

        let body = if content_type == EVENT_STREAM {
            let stream: ByteStream = Box::pin(
                response
                    .bytes_stream()
                    .map(|chunk| {
                        chunk.map_err(|e| TreatyError::HttpError(format!("Stream error: {e}")))
                    }),
            );
            ResponseBody::Streaming(StreamHandle::new(stream))
        } else {
            buffer_body(&content_type, response.bytes().await?)
        };

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url: final_url,
            body,
        })
    }
}

/// In-process request handler.
///
/// Receives a synthesized request whose body, when present, is JSON text.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        request: http::Request<Option<String>>,
    ) -> Result<http::Response<Bytes>, TreatyError>;
}

/// Handler backed by an async closure.
pub struct HandlerFn<F>(F);

/// Wrap an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(http::Request<Option<String>>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<http::Response<Bytes>, TreatyError>> + Send,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(http::Request<Option<String>>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<http::Response<Bytes>, TreatyError>> + Send,
{
    async fn handle(
        &self,
        request: http::Request<Option<String>>,
    ) -> Result<http::Response<Bytes>, TreatyError> {
        (self.0)(request).await
    }
}

/// Transport dispatching into an in-process [`Handler`].
#[derive(Clone)]
pub struct HandlerTransport {
    handler: Arc<dyn Handler>,
}

impl HandlerTransport {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }
}

impl std::fmt::Debug for HandlerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HandlerTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TreatyError> {
        let method = request.method.to_http()?;

        let mut builder = http::Request::builder().method(method).uri(&request.url);
        for (k, v) in &request.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        let body = request
            .body
            .as_ref()
            .map(EncodedBody::to_json_string)
            .transpose()?;
        let synthesized = builder.body(body)?;

        let response = self.handler.handle(synthesized).await?;

        let (parts, bytes) = response.into_parts();
        let headers = headermap_to_hashmap(&parts.headers);
        let content_type = media_type(&headers);

        Ok(RawResponse {
            status: parts.status.as_u16(),
            status_text: parts.status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url: request.url,
            body: buffer_body_json_first(&content_type, bytes),
        })
    }
}
