//! Server adapters
//!
//! In-process [`Handler`](crate::execution::http::Handler) implementations
//! for server frameworks, so a client can call an application without a
//! network round trip.
//!
//! - **Axum**: `impl Handler for axum::Router` (requires the `axum` feature)

#[cfg(feature = "axum")]
pub mod axum;
