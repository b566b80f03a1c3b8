//! # Treaty - A Typed Path-Builder HTTP Client
//!
//! Treaty turns chained segment accessors into HTTP requests. Each accessor
//! returns a new address node; a terminal method call finalizes the address
//! into a method and path, encodes the body, runs interceptors, dispatches
//! through a transport and decodes the response by content type.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Immutable addresses**: nodes share one pipeline and never mutate each other.
//! - **Body encoding**: JSON, plain text or multipart, chosen from the body's shape.
//! - **Interceptors**: request patches and response short-circuits, in registration order.
//! - **Content-type decoding**: JSON, text, bytes, forms and lazy SSE event streams.
//! - **Transports**: reqwest over the network, or an in-process handler such as an axum `Router`.
//! - **Subscriptions**: `subscribe` resolves to a WebSocket URL, connectable with
//!   the `ws` feature.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treaty::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = treaty("localhost:3000", TreatyConfig::new())?;
//!
//!     // POST http://localhost:3000/users
//!     let resp = client
//!         .at("users")
//!         .post(Some(json!({"name": "a"}).into()), None)
//!         .send()
//!         .await?;
//!
//!     match &resp.error {
//!         Some(err) => println!("{} {}", err.status, err.value),
//!         None => println!("{}", resp.json::<serde_json::Value>()?),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod defaults;
pub mod encoding;
pub mod error;
pub mod execution;
pub mod path;
pub mod server_adapters;
pub mod streaming;
pub mod types;
pub mod utils;
pub mod ws;

pub use client::{Invocation, PendingRequest, Treaty, treaty};
pub use config::TreatyConfig;
pub use error::{FetchError, TreatyError};
pub use execution::http::{
    Handler, HeaderSource, LoggingInterceptor, RequestInterceptor, ResponseInterceptor,
    handler_fn, request_fn, response_fn,
};
pub use streaming::EventStream;
pub use utils::parse_stringified_value;
pub use ws::Subscription;

#[cfg(feature = "ws")]
pub use ws::WebSocket;

/// Common imports.
pub mod prelude {
    pub use crate::client::{Invocation, PendingRequest, Treaty, treaty};
    pub use crate::config::TreatyConfig;
    pub use crate::error::{FetchError, TreatyError};
    pub use crate::execution::http::{
        Handler, HeaderSource, RequestInterceptor, ResponseInterceptor, handler_fn, request_fn,
        response_fn,
    };
    pub use crate::streaming::EventStream;
    pub use crate::types::{
        Body, Data, FetchOptions, FileLike, HttpConfig, Method, RawResponse, RequestConfig,
        RequestOptions, RequestPatch, TreatyResponse,
    };
    pub use crate::ws::Subscription;
}
