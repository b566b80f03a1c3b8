//! Core types
//!
//! Methods, request bodies, request descriptors and responses.

pub mod body;
pub mod http;
pub mod method;
pub mod request;
pub mod response;

pub use body::{Body, Field, Fields, FileLike};
pub use self::http::{FetchOptions, HttpConfig, HttpConfigBuilder};
pub use method::{METHOD_TOKENS, Method};
pub use request::{RequestConfig, RequestOptions, RequestPatch};
pub use response::{Data, RawResponse, ResponseBody, TreatyResponse};
