//! Unified entry for test support modules
//!
//! - Lightweight wrappers around the mock backends (mockito, wiremock)
//! - Client constructors shared across integration tests

#![allow(dead_code)]

pub mod mockito;

use serde_json::Value;
use treaty::prelude::*;

/// Client root for a mock server base URL.
pub fn client_for(base_url: &str) -> Treaty {
    treaty(base_url, TreatyConfig::new()).expect("build treaty client")
}

/// Client root for a mock server base URL with a custom config.
pub fn client_with(base_url: &str, config: TreatyConfig) -> Treaty {
    treaty(base_url, config).expect("build treaty client")
}

/// The JSON value carried by a successful response.
pub fn data_value(resp: TreatyResponse) -> Value {
    match resp.into_result() {
        Ok(Some(data)) => data.into_value(),
        Ok(None) => Value::Null,
        Err(e) => panic!("unexpected fetch error: {e}"),
    }
}
