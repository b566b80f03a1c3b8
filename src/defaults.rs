//! Default values shared across the crate.

pub mod http {
    use std::time::Duration;

    /// Connection timeout applied when the client is built from `HttpConfig`.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub const USER_AGENT: &str = concat!("treaty/", env!("CARGO_PKG_VERSION"));

    /// Origin used for addresses dispatched to an in-process handler.
    pub const IN_PROCESS_ORIGIN: &str = "http://localhost";
}

/// Host literals treated as loopback when choosing `http://` / `ws://`.
pub const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "0.0.0.0"];
