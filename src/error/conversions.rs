//! Type Conversions for TreatyError
//!
//! From implementations for the error types raised by the crates we call into.

use super::types::TreatyError;

impl From<reqwest::Error> for TreatyError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for TreatyError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for TreatyError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<http::Error> for TreatyError {
    fn from(err: http::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for TreatyError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for TreatyError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
