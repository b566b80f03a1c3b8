//! Utilities
//!
//! - MIME guessing for uploaded files
//! - The stringified-value parser used by response decoding and streams

pub mod mime;
pub mod parsing;

pub use parsing::parse_stringified_value;
