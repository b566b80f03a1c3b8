//! Core error types.

use serde_json::Value;
use thiserror::Error;

/// Status used when a response interceptor fails with something other than a
/// [`FetchError`].
pub const INTERCEPTOR_ERROR_STATUS: u16 = 422;

/// Typed failure carried in the `error` slot of a [`crate::TreatyResponse`].
///
/// Produced for responses whose status lies outside `[200, 300)` and for
/// response interceptors that fail. `value` holds the decoded payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("fetch error {status}: {value}")]
pub struct FetchError {
    pub status: u16,
    pub value: Value,
}

impl FetchError {
    pub fn new(status: u16, value: impl Into<Value>) -> Self {
        Self {
            status,
            value: value.into(),
        }
    }

    /// HTTP status the error was produced for.
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Decoded payload.
    pub const fn value(&self) -> &Value {
        &self.value
    }

    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserialize the payload into a typed error body.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TreatyError> {
        serde_json::from_value(self.value.clone()).map_err(TreatyError::from)
    }
}

/// Errors raised by the client itself.
///
/// HTTP-level failures never show up here: they are recovered into
/// [`FetchError`] on the response. Only failures that leave no response to
/// decode are returned as `Err`.
#[derive(Debug, Error)]
pub enum TreatyError {
    /// The network client failed without producing a response.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The in-process handler failed without producing a response.
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("IO error: {0}")]
    IoError(String),

    /// A request interceptor aborted the call.
    #[error("Interceptor error: {0}")]
    InterceptorError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),
}

impl TreatyError {
    /// True for failures that happened before any response was received.
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::TransportError(_))
    }

    /// HTTP status, when the error carries one.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Fetch(e) => Some(e.status),
            _ => None,
        }
    }

    /// Convert into the typed fetch error stored on a response.
    ///
    /// `Fetch` errors are kept as they are; anything else is wrapped with
    /// [`INTERCEPTOR_ERROR_STATUS`] and its message as payload.
    pub fn into_fetch_error(self) -> FetchError {
        match self {
            Self::Fetch(e) => e,
            other => FetchError::new(INTERCEPTOR_ERROR_STATUS, other.to_string()),
        }
    }
}
