//! Address finalization.
//!
//! A call on an address node is overloaded: depending on the shape of its
//! arguments it either performs a request or adds one computed segment.
//! [`disambiguate`] makes that choice explicit.

use crate::types::{Body, Method};

/// Outcome of a call on an address node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Append the single value of the body as a segment.
    Descend(String),
    /// Keep the node as it is.
    Retain,
    /// Perform a request.
    Finalize { method: Method, path: String },
}

/// Decide what a call with `body` and `options` does on `segments`.
///
/// The call finalizes when any of these hold:
/// - there is no body, or the body is falsy (`""`, `0`, `false`, `null`);
/// - options were passed;
/// - the body is object-like (an object or array) without exactly one key;
/// - the last segment is a method token.
///
/// Otherwise a one-key object body descends by its value, and any other
/// body leaves the node unchanged.
///
/// A resource literally named like a method (`client.at("post")`) is
/// therefore always treated as the method, even with a one-key body.
pub fn disambiguate(segments: &[String], body: Option<&Body>, has_options: bool) -> Decision {
    let tail_is_method = segments
        .last()
        .is_some_and(|s| Method::is_method_token(s));

    let finalize = match body {
        None => true,
        Some(b) => {
            b.is_falsy()
                || has_options
                || b.key_count().is_some_and(|n| n != 1)
                || tail_is_method
        }
    };

    if finalize {
        let (method, path) = finalize_path(segments);
        return Decision::Finalize { method, path };
    }

    match body.and_then(Body::first_segment) {
        Some(segment) => Decision::Descend(segment),
        None => Decision::Retain,
    }
}

/// Split an address into its method and `/`-joined path.
///
/// The last segment is the method; an empty address is `GET /`.
pub fn finalize_path(segments: &[String]) -> (Method, String) {
    match segments.split_last() {
        Some((last, rest)) => (Method::from_segment(last), format!("/{}", rest.join("/"))),
        None => (Method::Get, "/".to_string()),
    }
}
