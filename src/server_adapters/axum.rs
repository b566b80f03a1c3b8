//! Axum in-process dispatch
//!
//! A `Router` is driven directly through `tower::ServiceExt::oneshot`.
//!
//! ```rust,ignore
//! use axum::{Json, Router, routing::get};
//! use treaty::{Treaty, TreatyConfig};
//!
//! let app = Router::new()
//!     .route("/users/{id}", get(|| async { Json(serde_json::json!({"id": 1})) }));
//! let client = Treaty::with_handler(app, TreatyConfig::new());
//! let resp = client.at("users").param(1).get(None).send().await?;
//! ```

use async_trait::async_trait;
use axum::Router;
use axum::body::Body as AxumBody;
use bytes::Bytes;
use tower::ServiceExt;

use crate::error::TreatyError;
use crate::execution::http::Handler;

#[async_trait]
impl Handler for Router {
    async fn handle(
        &self,
        request: http::Request<Option<String>>,
    ) -> Result<http::Response<Bytes>, TreatyError> {
        let (parts, body) = request.into_parts();
        let body = body.map(AxumBody::from).unwrap_or_else(AxumBody::empty);

        let response = match self
            .clone()
            .oneshot(http::Request::from_parts(parts, body))
            .await
        {
            Ok(r) => r,
            Err(never) => match never {},
        };

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| TreatyError::TransportError(format!("Failed to read handler body: {e}")))?;

        Ok(http::Response::from_parts(parts, bytes))
    }
}
