//! Error handling types for treaty.
//!
//! - [`TreatyError`]: failures returned as `Err` (transport, configuration, interceptors)
//! - [`FetchError`]: HTTP-level failures recovered into the response's `error` slot

mod conversions;
pub mod types;

pub use types::*;
