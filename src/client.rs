//! Address builder.
//!
//! A [`Treaty`] node is an immutable address: every accessor returns a new
//! node with one more segment, so independent chains never interfere. A
//! terminal call finalizes the address into a method and path and hands it
//! to the shared [`Pipeline`].
//!
//! ```rust,ignore
//! let client = treaty("localhost:3000", TreatyConfig::new())?;
//!
//! // GET http://localhost:3000/users/1
//! let resp = client
//!     .at("users")
//!     .param("1")
//!     .get(None)
//!     .send()
//!     .await?;
//! ```

use crate::config::{TreatyConfig, normalize_domain};
use crate::defaults;
use crate::error::TreatyError;
use crate::execution::http::build_http_client_from_config;
use crate::execution::http::query::build_query_string;
use crate::execution::http::transport::{
    Handler, HandlerTransport, ReqwestTransport, Transport, TransportRequest,
};
use crate::execution::{Call, Pipeline};
use crate::path::{Decision, disambiguate, finalize_path};
use crate::types::{Body, Method, RequestOptions, TreatyResponse};
use crate::ws::{Subscription, ws_url};
use std::fmt;
use std::sync::Arc;

/// Segment name that never extends an address.
const INDEX_SEGMENT: &str = "index";

/// Node of the address tree.
#[derive(Clone)]
pub struct Treaty {
    pipeline: Arc<Pipeline>,
    segments: Vec<String>,
}

/// Create a client root for a network domain.
pub fn treaty(domain: &str, config: TreatyConfig) -> Result<Treaty, TreatyError> {
    Treaty::new(domain, config)
}

impl Treaty {
    /// Client root dispatching over the network.
    ///
    /// The domain is normalized unless `keep_domain` is set. The configured
    /// `http_client` is used when present; otherwise one is built from
    /// `config.http`.
    pub fn new(domain: &str, config: TreatyConfig) -> Result<Self, TreatyError> {
        let client = match &config.http_client {
            Some(client) => client.clone(),
            None => build_http_client_from_config(&config.http)?,
        };
        let domain = normalize_domain(domain, config.keep_domain);
        Ok(Self::with_transport(
            domain,
            Arc::new(ReqwestTransport::new(client)),
            &config,
        ))
    }

    /// Client root dispatching into an in-process handler.
    pub fn with_handler<H: Handler + 'static>(handler: H, config: TreatyConfig) -> Self {
        tracing::warn!(
            target: "treaty::http",
            origin = defaults::http::IN_PROCESS_ORIGIN,
            "dispatching to an in-process handler; requests bypass the network"
        );
        Self::with_transport(
            defaults::http::IN_PROCESS_ORIGIN,
            Arc::new(HandlerTransport::new(Arc::new(handler))),
            &config,
        )
    }

    /// Client root over any transport. The domain is used as given.
    pub fn with_transport(
        domain: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: &TreatyConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(domain, transport, config)),
            segments: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        self.pipeline.domain()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Descend by name. `index` leaves the address unchanged.
    pub fn at(&self, name: &str) -> Self {
        if name == INDEX_SEGMENT {
            return self.clone();
        }
        self.push(name.to_string())
    }

    /// Descend by a computed segment, such as a resource id.
    pub fn param(&self, value: impl fmt::Display) -> Self {
        self.push(value.to_string())
    }

    fn push(&self, segment: String) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self {
            pipeline: Arc::clone(&self.pipeline),
            segments,
        }
    }

    /// Call the node with `(body, options)`.
    ///
    /// See [`disambiguate`] for how the arguments decide between a request,
    /// a computed segment and no change.
    pub fn invoke(&self, body: Option<Body>, options: Option<RequestOptions>) -> Invocation {
        match disambiguate(&self.segments, body.as_ref(), options.is_some()) {
            Decision::Descend(segment) => Invocation::Descend(self.push(segment)),
            Decision::Retain => Invocation::Retain(self.clone()),
            Decision::Finalize { method, path } => self.finalize(method, path, body, options),
        }
    }

    fn finalize(
        &self,
        method: Method,
        path: String,
        body: Option<Body>,
        options: Option<RequestOptions>,
    ) -> Invocation {
        if method == Method::Subscribe {
            return Invocation::Subscribe(self.subscription(&path, body.as_ref()));
        }
        Invocation::Request(PendingRequest {
            pipeline: Arc::clone(&self.pipeline),
            call: Call {
                method,
                path,
                body,
                options,
            },
        })
    }

    fn subscription(&self, path: &str, body: Option<&Body>) -> Subscription {
        let query = build_query_string(RequestOptions::query_from_body(body).as_ref());
        Subscription::new(ws_url(self.domain(), path, &query))
    }

    fn request(
        &self,
        token: &str,
        body: Option<Body>,
        options: Option<RequestOptions>,
    ) -> PendingRequest {
        let node = self.at(token);
        let (method, path) = finalize_path(&node.segments);
        PendingRequest {
            pipeline: Arc::clone(&self.pipeline),
            call: Call {
                method,
                path,
                body,
                options,
            },
        }
    }

    /// `GET` this address. Query, headers and fetch options are read from
    /// the body's `query`, `headers` and `fetch` keys.
    pub fn get(&self, body: Option<Body>) -> PendingRequest {
        self.request("get", body, None)
    }

    /// `HEAD` this address; options are read from the body like [`Treaty::get`].
    pub fn head(&self, body: Option<Body>) -> PendingRequest {
        self.request("head", body, None)
    }

    pub fn post(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("post", body, options)
    }

    pub fn put(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("put", body, options)
    }

    pub fn patch(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("patch", body, options)
    }

    pub fn delete(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("delete", body, options)
    }

    pub fn options(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("options", body, options)
    }

    pub fn connect(&self, body: Option<Body>, options: Option<RequestOptions>) -> PendingRequest {
        self.request("connect", body, options)
    }

    /// WebSocket endpoint of this address. The query is read from the
    /// body's `query` key.
    pub fn subscribe(&self, body: Option<Body>) -> Subscription {
        let node = self.at("subscribe");
        let (_, path) = finalize_path(&node.segments);
        self.subscription(&path, body.as_ref())
    }
}

impl fmt::Debug for Treaty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Treaty")
            .field("domain", &self.domain())
            .field("segments", &self.segments)
            .finish()
    }
}

/// Result of [`Treaty::invoke`].
#[derive(Debug)]
pub enum Invocation {
    /// A new node with one computed segment appended.
    Descend(Treaty),
    /// The same address.
    Retain(Treaty),
    Request(PendingRequest),
    Subscribe(Subscription),
}

impl Invocation {
    /// The node, when the call did not finalize.
    pub fn into_node(self) -> Option<Treaty> {
        match self {
            Self::Descend(node) | Self::Retain(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_request(self) -> Option<PendingRequest> {
        match self {
            Self::Request(req) => Some(req),
            _ => None,
        }
    }

    pub fn into_subscription(self) -> Option<Subscription> {
        match self {
            Self::Subscribe(sub) => Some(sub),
            _ => None,
        }
    }
}

/// A finalized call, not yet sent.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pipeline: Arc<Pipeline>,
    call: Call,
}

impl PendingRequest {
    pub fn method(&self) -> &Method {
        &self.call.method
    }

    pub fn path(&self) -> &str {
        &self.call.path
    }

    /// Resolve the request that would be dispatched, running request
    /// interceptors but not the transport.
    pub async fn prepare(self) -> Result<TransportRequest, TreatyError> {
        self.pipeline.prepare(self.call).await
    }

    /// Dispatch and decode.
    pub async fn send(self) -> Result<TreatyResponse, TreatyError> {
        self.pipeline.execute(self.call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodedBody;
    use serde_json::json;

    fn client(domain: &str) -> Treaty {
        Treaty::new(domain, TreatyConfig::new()).unwrap()
    }

    #[test]
    fn accessors_build_new_nodes() {
        let root = client("localhost:3000");
        let users = root.at("users");
        let one = users.param(1);
        assert!(root.segments().is_empty());
        assert_eq!(users.segments(), ["users"]);
        assert_eq!(one.segments(), ["users", "1"]);
        assert_eq!(root.domain(), "http://localhost:3000");
    }

    #[test]
    fn index_is_dropped() {
        let node = client("localhost").at("index").at("users").at("index");
        assert_eq!(node.segments(), ["users"]);
    }

    #[test]
    fn invoke_descends_with_single_key_object() {
        let node = client("localhost")
            .at("users")
            .invoke(Some(Body::from(json!({"id": "1"}))), None)
            .into_node()
            .unwrap();
        assert_eq!(node.segments(), ["users", "1"]);
    }

    #[test]
    fn invoke_retains_on_truthy_scalar() {
        let inv = client("localhost").at("users").invoke(Some(Body::from("x")), None);
        assert!(matches!(inv, Invocation::Retain(ref n) if n.segments() == ["users"]));
    }

    #[test]
    fn invoke_finalizes_on_method_tail() {
        let req = client("localhost")
            .at("users")
            .at("post")
            .invoke(Some(Body::from(json!({"name": "a"}))), None)
            .into_request()
            .unwrap();
        assert_eq!(req.method(), &Method::Post);
        assert_eq!(req.path(), "/users");
    }

    #[test]
    fn subscribe_invocations_return_the_socket_url() {
        let sub = client("localhost:3000")
            .at("chat")
            .at("subscribe")
            .invoke(None, None)
            .into_subscription()
            .unwrap();
        assert_eq!(sub.url(), "ws://localhost:3000/chat");

        let sub = client("https://api.io")
            .at("live")
            .subscribe(Some(Body::from(json!({"query": {"room": "a b"}}))));
        assert_eq!(sub.url(), "wss://api.io/live?room=a%20b");
    }

    #[tokio::test]
    async fn dynamic_segment_then_get_has_no_body() {
        let req = client("http://localhost:3000")
            .at("users")
            .invoke(Some(Body::from(json!({"id": "1"}))), None)
            .into_node()
            .unwrap()
            .get(None)
            .prepare()
            .await
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "http://localhost:3000/users/1");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn search_query_repeats_keys() {
        let req = client("http://localhost:3000")
            .at("search")
            .get(Some(Body::from(json!({"query": {"tag": ["a", "b"]}}))))
            .prepare()
            .await
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/search?tag=a&tag=b");
    }

    #[tokio::test]
    async fn root_call_is_get_slash() {
        let req = client("api.io")
            .invoke(None, None)
            .into_request()
            .unwrap()
            .prepare()
            .await
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "https://api.io/");
    }

    #[tokio::test]
    async fn post_with_options_sends_json() {
        let req = client("localhost")
            .at("users")
            .post(
                Some(Body::from(json!({"name": "a"}))),
                Some(RequestOptions::new().with_header("X-Trace", "1")),
            )
            .prepare()
            .await
            .unwrap();
        assert_eq!(req.url, "http://localhost/users");
        assert_eq!(req.headers["x-trace"], "1");
        assert_eq!(req.body, Some(EncodedBody::Json(json!({"name": "a"}))));
    }

    #[test]
    fn keep_domain_uses_domain_verbatim() {
        let node = Treaty::new("example.com/", TreatyConfig::new().with_keep_domain(true)).unwrap();
        assert_eq!(node.domain(), "example.com/");
    }

    #[test]
    fn invalid_http_config_fails_construction() {
        let config = TreatyConfig::new()
            .with_http_config(crate::types::HttpConfig::builder().proxy(Some("not a url")).build());
        assert!(matches!(
            Treaty::new("localhost", config),
            Err(TreatyError::ConfigurationError(_))
        ));
    }
}
