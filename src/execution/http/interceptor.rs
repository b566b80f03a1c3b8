//! Request and response interceptors.
//!
//! Request interceptors run in order before dispatch and may return a
//! [`RequestPatch`] to merge into the working config. Response interceptors
//! run in order after dispatch; the first one returning data short-circuits
//! decoding.

use crate::error::TreatyError;
use crate::types::{Data, RawResponse, RequestConfig, RequestPatch};
use async_trait::async_trait;

/// Hook run before a request is dispatched.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Returning `Err` aborts the call.
    async fn on_request(
        &self,
        path: &str,
        config: &RequestConfig,
    ) -> Result<Option<RequestPatch>, TreatyError>;
}

/// Hook run after a response is received.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// `Ok(Some(data))` becomes the result data and skips decoding. `Err` is
    /// recovered into the response's error slot.
    async fn on_response(&self, response: &RawResponse) -> Result<Option<Data>, TreatyError>;
}

/// Request interceptor backed by a closure.
pub struct RequestFn<F>(F);

/// Wrap a closure as a [`RequestInterceptor`].
pub fn request_fn<F>(f: F) -> RequestFn<F>
where
    F: Fn(&str, &RequestConfig) -> Result<Option<RequestPatch>, TreatyError> + Send + Sync,
{
    RequestFn(f)
}

#[async_trait]
impl<F> RequestInterceptor for RequestFn<F>
where
    F: Fn(&str, &RequestConfig) -> Result<Option<RequestPatch>, TreatyError> + Send + Sync,
{
    async fn on_request(
        &self,
        path: &str,
        config: &RequestConfig,
    ) -> Result<Option<RequestPatch>, TreatyError> {
        (self.0)(path, config)
    }
}

/// Response interceptor backed by a closure.
pub struct ResponseFn<F>(F);

/// Wrap a closure as a [`ResponseInterceptor`].
pub fn response_fn<F>(f: F) -> ResponseFn<F>
where
    F: Fn(&RawResponse) -> Result<Option<Data>, TreatyError> + Send + Sync,
{
    ResponseFn(f)
}

#[async_trait]
impl<F> ResponseInterceptor for ResponseFn<F>
where
    F: Fn(&RawResponse) -> Result<Option<Data>, TreatyError> + Send + Sync,
{
    async fn on_response(&self, response: &RawResponse) -> Result<Option<Data>, TreatyError> {
        (self.0)(response)
    }
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn on_request(
        &self,
        path: &str,
        config: &RequestConfig,
    ) -> Result<Option<RequestPatch>, TreatyError> {
        tracing::debug!(
            target: "treaty::http",
            method = %config.method,
            path = %path,
            url = %config.url,
            "sending request"
        );
        Ok(None)
    }
}

#[async_trait]
impl ResponseInterceptor for LoggingInterceptor {
    async fn on_response(&self, response: &RawResponse) -> Result<Option<Data>, TreatyError> {
        tracing::debug!(
            target: "treaty::http",
            url = %response.url,
            status = %response.status,
            "response received"
        );
        Ok(None)
    }
}
