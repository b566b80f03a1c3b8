//! mockito test utilities
//!
//! Goals:
//! - Provide a unified async Server creation and a JSON response helper
//! - Insulate tests from future mockito API changes

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};

/// Start an async mockito Server
pub async fn start() -> ServerGuard {
    Server::new_async().await
}

/// Get the Server base URL (including scheme)
pub fn url(server: &ServerGuard) -> String {
    server.url()
}

/// JSON response mock (sets `content-type: application/json`)
pub async fn json_mock<P: Into<Matcher>>(
    server: &mut ServerGuard,
    method: &str,
    path: P,
    status: u16,
    body_json: &str,
) -> Mock {
    server
        .mock(method, path)
        .with_status(status as usize)
        .with_header("content-type", "application/json")
        .with_body(body_json)
        .create_async()
        .await
}
