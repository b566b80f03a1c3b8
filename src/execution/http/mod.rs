//! HTTP execution layer
//!
//! Header resolution, query encoding, interceptors, transports and reqwest
//! client construction.

pub mod client;
pub mod headers;
pub mod interceptor;
pub mod query;
pub mod transport;

pub use client::build_http_client_from_config;
pub use headers::{HeaderSource, Headers, resolve_headers};
pub use interceptor::{
    LoggingInterceptor, RequestInterceptor, ResponseInterceptor, request_fn, response_fn,
};
pub use query::build_query_string;
pub use transport::{
    Handler, HandlerTransport, ReqwestTransport, Transport, TransportRequest, handler_fn,
};
