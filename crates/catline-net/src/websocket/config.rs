//! Socket session configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::error::SocketError;

/// Callback invoked once the reconnect budget is spent.
pub type FailedCallback = Arc<dyn Fn(&SocketError) + Send + Sync>;

/// Configuration of a socket session's endpoint and handshake.
#[derive(Clone, Debug)]
pub struct WebSocketConfig {
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
    /// Server host name, without scheme.
    pub host: String,
    /// Server port; omitted from the URL when `None`.
    pub port: Option<u16>,
    /// Socket base path on the server.
    pub path: String,
    /// User the session connects as; also the default sender of outbound frames.
    pub user_id: String,
    /// Custom headers to send during the handshake.
    pub headers: HashMap<String, String>,
    /// Reconnection policy.
    pub reconnect: ReconnectConfig,
}

impl WebSocketConfig {
    /// Create a configuration for `host` with default path (`ws`) and user (`user`).
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            secure: false,
            host: host.into(),
            port: None,
            path: "ws".to_string(),
            user_id: "user".to_string(),
            headers: HashMap::new(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Use a secure (`wss://`) connection.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the socket base path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the user the session connects as.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Add a custom header for the WebSocket handshake.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the reconnection policy.
    pub fn reconnect_config(mut self, config: ReconnectConfig) -> Self {
        self.reconnect = config;
        self
    }

    /// The connection URL: `ws[s]://<host>[:<port>]/<path>/<user_id>`.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let host = strip_scheme(self.host.trim()).trim_end_matches('/');
        let port = self.port.map(|port| format!(":{port}")).unwrap_or_default();
        let path = segment(&self.path);
        let user = segment(&self.user_id);

        if path.is_empty() {
            format!("{scheme}://{host}{port}/{user}")
        } else {
            format!("{scheme}://{host}{port}/{path}/{user}")
        }
    }
}

fn strip_scheme(host: &str) -> &str {
    host.split_once("://").map_or(host, |(_, rest)| rest)
}

fn segment(value: &str) -> &str {
    value.trim().trim_matches('/')
}

/// What to do after an unexpected close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reconnect after the given delay.
    Reconnect(Duration),
    /// Give up; carries the configured retry limit.
    Exhausted(u32),
}

/// Configuration for automatic reconnection.
///
/// The session counts unexpected closes. While the count stays below
/// `retries` (or `retries` is negative) it reconnects after a fixed `delay`;
/// otherwise it calls `on_failed` once and stops.
#[derive(Clone)]
pub struct ReconnectConfig {
    /// Delay between an unexpected close and the reconnect attempt.
    pub delay: Duration,
    /// Retry limit. Negative means retry forever.
    pub retries: i32,
    /// Called with [`SocketError::FailedRetry`] when the limit is reached.
    pub on_failed: Option<FailedCallback>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
            retries: 3,
            on_failed: None,
        }
    }
}

impl ReconnectConfig {
    /// Create a new reconnect configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay before reconnecting.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the retry limit. Negative values retry forever.
    pub fn retries(mut self, retries: i32) -> Self {
        self.retries = retries;
        self
    }

    /// Retry forever.
    pub fn infinite(self) -> Self {
        self.retries(-1)
    }

    /// Set the exhaustion callback.
    pub fn on_failed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        self.on_failed = Some(Arc::new(callback));
        self
    }

    /// Decide what follows the `retried`-th unexpected close.
    ///
    /// The count includes the close of the first connection, so a limit of
    /// `n` allows `n - 1` reconnects.
    pub fn decide(&self, retried: u32) -> RetryDecision {
        if self.retries < 0 || i64::from(retried) < i64::from(self.retries) {
            RetryDecision::Reconnect(self.delay)
        } else {
            RetryDecision::Exhausted(self.retries.unsigned_abs())
        }
    }
}

impl std::fmt::Debug for ReconnectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectConfig")
            .field("delay", &self.delay)
            .field("retries", &self.retries)
            .field("on_failed", &self.on_failed.is_some())
            .finish()
    }
}
