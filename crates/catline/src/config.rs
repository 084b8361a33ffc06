//! Client configuration.

use std::sync::Arc;
use std::time::Duration;

use catline_net::websocket::{FailedCallback, ReconnectConfig, SocketError, WebSocketConfig};

/// WebSocket settings of a [`CatConfig`].
#[derive(Clone)]
pub struct WsSettings {
    /// Socket base path on the server.
    pub path: String,
    /// Delay before reconnecting after an unexpected close.
    pub delay: Duration,
    /// Reconnect limit. Negative means retry forever.
    pub retries: i32,
    /// Called once the reconnect limit is reached.
    pub on_failed: Option<FailedCallback>,
}

impl Default for WsSettings {
    fn default() -> Self {
        Self {
            path: "ws".to_string(),
            delay: Duration::from_secs(3),
            retries: 3,
            on_failed: None,
        }
    }
}

impl WsSettings {
    /// Create settings with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the socket base path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the reconnect delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the reconnect limit. Negative values retry forever.
    pub fn retries(mut self, retries: i32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the callback invoked when reconnecting gives up.
    pub fn on_failed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        self.on_failed = Some(Arc::new(callback));
        self
    }

    fn reconnect_config(&self) -> ReconnectConfig {
        let mut config = ReconnectConfig::new()
            .delay(self.delay)
            .retries(self.retries);
        config.on_failed = self.on_failed.clone();
        config
    }
}

impl std::fmt::Debug for WsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSettings")
            .field("path", &self.path)
            .field("delay", &self.delay)
            .field("retries", &self.retries)
            .field("on_failed", &self.on_failed.is_some())
            .finish()
    }
}

/// Configuration of a [`CatClient`](crate::CatClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use catline::{CatConfig, WsSettings};
///
/// let config = CatConfig::new("cat.example.com")
///     .secure(true)
///     .no_port()
///     .user("alice")
///     .auth_key("meow")
///     .ws(WsSettings::new().retries(-1).delay(Duration::from_secs(1)));
///
/// assert_eq!(config.http_base_url(), "https://cat.example.com");
/// assert_eq!(config.websocket_config().url(), "wss://cat.example.com/ws/alice");
/// ```
#[derive(Clone, Debug)]
pub struct CatConfig {
    /// Server host, without scheme.
    pub base_url: String,
    /// Use `https://` and `wss://`.
    pub secure: bool,
    /// Connect as soon as the client is constructed.
    pub instant: bool,
    /// Timeout of REST requests.
    pub timeout: Duration,
    /// Server port; omitted from URLs when `None`.
    pub port: Option<u16>,
    /// User the client acts as.
    pub user: String,
    /// Key sent as the `access_token` header.
    pub auth_key: Option<String>,
    /// WebSocket settings.
    pub ws: WsSettings,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            base_url: "localhost".to_string(),
            secure: false,
            instant: true,
            timeout: Duration::from_secs(10),
            port: Some(1865),
            user: "user".to_string(),
            auth_key: None,
            ws: WsSettings::default(),
        }
    }
}

impl CatConfig {
    /// Create a configuration for `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Use secure connections.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Whether to connect on construction.
    pub fn instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }

    /// Set the REST request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Leave the port out of URLs.
    pub fn no_port(mut self) -> Self {
        self.port = None;
        self
    }

    /// Set the user.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the authentication key.
    pub fn auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }

    /// Set the WebSocket settings.
    pub fn ws(mut self, ws: WsSettings) -> Self {
        self.ws = ws;
        self
    }

    /// Host with any scheme and trailing slash removed.
    fn host(&self) -> &str {
        let host = self.base_url.trim();
        let host = host.split_once("://").map_or(host, |(_, rest)| rest);
        host.trim_end_matches('/')
    }

    /// Base URL of the REST API: `http[s]://<host>[:<port>]`.
    pub fn http_base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}", self.host()),
            None => format!("{scheme}://{}", self.host()),
        }
    }

    /// Identity headers sent with every request and with the socket handshake.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(key) = &self.auth_key {
            headers.push(("access_token".to_string(), key.clone()));
        }
        headers.push(("user_id".to_string(), self.user.clone()));
        headers
    }

    /// The socket session configuration derived from this configuration.
    pub fn websocket_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::new(self.host())
            .secure(self.secure)
            .path(self.ws.path.clone())
            .user_id(self.user.clone())
            .reconnect_config(self.ws.reconnect_config());
        config.port = self.port;
        for (name, value) in self.headers() {
            config = config.header(name, value);
        }
        config
    }
}
