//! Method tokens recognised at the tail of an address.

use crate::error::TreatyError;
use std::fmt;

/// Segment names that finalize an address when they appear last.
pub const METHOD_TOKENS: [&str; 9] = [
    "get",
    "post",
    "put",
    "delete",
    "patch",
    "options",
    "head",
    "connect",
    "subscribe",
];

/// Request method resolved from the trailing address segment.
///
/// `Subscribe` never goes over HTTP; it opens a WebSocket subscription.
/// Any other trailing segment is kept verbatim (upper-cased) as an
/// extension method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Connect,
    Subscribe,
    Extension(String),
}

impl Method {
    /// True when `segment` is one of [`METHOD_TOKENS`].
    pub fn is_method_token(segment: &str) -> bool {
        METHOD_TOKENS.contains(&segment)
    }

    /// Resolve a trailing segment into a method.
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "get" => Self::Get,
            "post" => Self::Post,
            "put" => Self::Put,
            "delete" => Self::Delete,
            "patch" => Self::Patch,
            "options" => Self::Options,
            "head" => Self::Head,
            "connect" => Self::Connect,
            "subscribe" => Self::Subscribe,
            other => Self::Extension(other.to_uppercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Connect => "CONNECT",
            Self::Subscribe => "SUBSCRIBE",
            Self::Extension(m) => m,
        }
    }

    /// GET, HEAD and SUBSCRIBE never carry a body; their query, headers and
    /// transport options are read from the first call argument instead.
    pub const fn is_bodyless(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Subscribe)
    }

    /// Convert into the transport's method type.
    pub fn to_http(&self) -> Result<reqwest::Method, TreatyError> {
        match self {
            Self::Subscribe => Err(TreatyError::InvalidMethod(
                "SUBSCRIBE is dispatched over WebSocket, not HTTP".to_string(),
            )),
            other => reqwest::Method::from_bytes(other.as_str().as_bytes())
                .map_err(|e| TreatyError::InvalidMethod(format!("{}: {e}", other.as_str()))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
