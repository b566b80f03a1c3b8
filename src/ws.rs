//! WebSocket subscriptions.
//!
//! `subscribe` calls never go over HTTP. They resolve to a [`Subscription`]
//! holding the `ws://` or `wss://` URL of the route. With the `ws` feature
//! the subscription can be connected through `tokio-tungstenite`.

use crate::config::is_loopback;

/// WebSocket endpoint of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    url: String,
}

impl Subscription {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build the WebSocket URL for `path` and `query` under `domain`.
///
/// `https://` maps to `wss://` and `http://` to `ws://`. Any other domain
/// gets `ws://` when it mentions a loopback host and `wss://` otherwise.
/// Everything up to the last `://` is replaced; a domain without one gets
/// the scheme prefixed.
pub fn ws_url(domain: &str, path: &str, query: &str) -> String {
    let scheme = if domain.starts_with("https://") {
        "wss://"
    } else if domain.starts_with("http://") || is_loopback(domain) {
        "ws://"
    } else {
        "wss://"
    };

    let rest = match domain.rfind("://") {
        Some(idx) => &domain[idx + 3..],
        None => domain,
    };

    format!("{scheme}{rest}{path}{query}")
}

#[cfg(feature = "ws")]
pub use connection::WebSocket;

#[cfg(feature = "ws")]
mod connection {
    use super::Subscription;
    use crate::error::TreatyError;
    use crate::utils::parse_stringified_value;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::Value;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::protocol::Message;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

    type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

    impl Subscription {
        /// Open the WebSocket connection.
        pub async fn connect(&self) -> Result<WebSocket, TreatyError> {
            let (stream, _resp) = connect_async(self.url.as_str())
                .await
                .map_err(|e| TreatyError::WebSocketError(format!("connect failed: {e}")))?;
            tracing::debug!(target: "treaty::http", url=%self.url, "websocket connected");
            Ok(WebSocket { stream })
        }
    }

    /// Connected subscription.
    pub struct WebSocket {
        stream: WsStream,
    }

    impl WebSocket {
        /// Send a value. Strings go out verbatim, anything else as JSON text.
        pub async fn send(&mut self, value: &Value) -> Result<(), TreatyError> {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.stream
                .send(Message::Text(text.into()))
                .await
                .map_err(|e| TreatyError::WebSocketError(format!("send failed: {e}")))
        }

        /// Next message, parsed like a response body. Control frames are
        /// skipped; `None` once the peer closes.
        pub async fn next_value(&mut self) -> Option<Result<Value, TreatyError>> {
            while let Some(msg) = self.stream.next().await {
                let msg = match msg {
                    Ok(m) => m,
                    Err(e) => {
                        return Some(Err(TreatyError::WebSocketError(format!(
                            "receive failed: {e}"
                        ))));
                    }
                };

                match msg {
                    Message::Text(text) => return Some(Ok(parse_stringified_value(text.as_str()))),
                    Message::Binary(bin) => {
                        return Some(Ok(parse_stringified_value(&String::from_utf8_lossy(&bin))));
                    }
                    Message::Close(_) => return None,
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                }
            }
            None
        }

        pub async fn close(&mut self) -> Result<(), TreatyError> {
            self.stream
                .close(None)
                .await
                .map_err(|e| TreatyError::WebSocketError(format!("close failed: {e}")))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;
        use tokio::net::TcpListener;

        #[tokio::test]
        async fn echoes_values_through_a_local_server() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            let server = tokio::spawn(async move {
                let (tcp, _) = listener.accept().await.unwrap();
                let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    if msg.is_close() {
                        break;
                    }
                    if msg.is_text() {
                        ws.send(msg).await.unwrap();
                    }
                }
            });

            let sub = Subscription::new(format!("ws://{addr}/chat"));
            let mut ws = sub.connect().await.unwrap();

            ws.send(&json!({"hello": "world"})).await.unwrap();
            assert_eq!(ws.next_value().await.unwrap().unwrap(), json!({"hello": "world"}));

            ws.send(&json!("42")).await.unwrap();
            assert_eq!(ws.next_value().await.unwrap().unwrap(), json!(42));

            ws.close().await.unwrap();
            server.await.unwrap();
        }

        #[tokio::test]
        async fn connect_failure_is_a_websocket_error() {
            let sub = Subscription::new("ws://127.0.0.1:1/none");
            assert!(matches!(sub.connect().await, Err(TreatyError::WebSocketError(_))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_schemes_map_directly() {
        assert_eq!(ws_url("https://api.io", "/chat", ""), "wss://api.io/chat");
        assert_eq!(
            ws_url("http://localhost:3000", "/chat", "?room=1"),
            "ws://localhost:3000/chat?room=1"
        );
    }

    #[test]
    fn other_schemes_use_the_loopback_heuristic() {
        assert_eq!(ws_url("ftp://localhost", "/", ""), "ws://localhost/");
        assert_eq!(ws_url("ftp://example.com", "/", ""), "wss://example.com/");
    }

    #[test]
    fn schemeless_domains_get_a_prefix() {
        assert_eq!(ws_url("127.0.0.1:8080", "/live", ""), "ws://127.0.0.1:8080/live");
        assert_eq!(ws_url("example.com", "/live", ""), "wss://example.com/live");
    }

    #[test]
    fn replacement_runs_to_the_last_separator() {
        assert_eq!(ws_url("http://proxy://example.com", "/x", ""), "ws://example.com/x");
    }
}
