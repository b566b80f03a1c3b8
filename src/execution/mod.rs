//! Execution
//!
//! The HTTP layer and the pipeline that drives it.

pub mod http;
pub mod pipeline;

pub use pipeline::{Call, Pipeline};
