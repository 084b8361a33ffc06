//! The client facade.

use catline_net::websocket::{ReadyState, SocketError, SocketMessage, SocketSession};
use serde_json::{Map, Value};

use crate::api::CatApi;
use crate::config::CatConfig;
use crate::error::Result;

/// Client for a chat-agent server.
///
/// Combines a reconnecting [`SocketSession`] for chat with a [`CatApi`] for
/// the REST endpoints. Both carry the same identity: the configured user and,
/// when set, the authentication key. Changing either one tears both down and
/// builds them again.
///
/// Dropping the client closes its socket.
///
/// # Example
///
/// ```ignore
/// use catline::{CatClient, CatConfig};
///
/// let client = CatClient::new(CatConfig::new("localhost").user("alice"))?;
///
/// client
///     .on_connected(|| println!("connected"))
///     .on_message(|message| println!("cat: {}", message.content))
///     .on_error(|error| eprintln!("{error}"));
///
/// client.send("Hello, cat!", None, None)?;
///
/// if let Some(api) = client.api() {
///     println!("{:?}", api.status().await?);
/// }
/// ```
pub struct CatClient {
    config: CatConfig,
    session: SocketSession,
    api: Option<CatApi>,
}

impl CatClient {
    /// Create a client, connecting right away unless `config.instant` is false.
    pub fn new(config: CatConfig) -> Result<Self> {
        let session = SocketSession::new(config.websocket_config());
        let mut client = Self {
            config,
            session,
            api: None,
        };
        if client.config.instant {
            client.init()?;
        }
        Ok(client)
    }

    /// Build the REST adapter and open the socket.
    ///
    /// Does nothing when both already exist; call [`reset`](Self::reset)
    /// first to rebuild them.
    pub fn init(&mut self) -> Result<&mut Self> {
        if self.session.has_socket() && self.api.is_some() {
            tracing::debug!(target: "catline::client", "Already initialized");
            return Ok(self);
        }

        let api = CatApi::new(&self.config)?;
        self.session.set_config(self.config.websocket_config());
        self.session.connect();
        self.api = Some(api);

        tracing::debug!(
            target: "catline::client",
            base_url = %self.config.http_base_url(),
            user = %self.config.user,
            "Initialized"
        );
        Ok(self)
    }

    /// Close the socket, clear its retry counter and drop the REST adapter.
    ///
    /// Registered handlers are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.session.reset();
        self.api = None;
        self
    }

    /// Close the socket without reconnecting.
    pub fn close(&self) -> &Self {
        self.session.close();
        self
    }

    /// Send a chat message; see [`SocketSession::send`].
    pub fn send(
        &self,
        message: impl Into<String>,
        data: Option<Map<String, Value>>,
        user_id: Option<&str>,
    ) -> Result<&Self> {
        self.session.send(message, data, user_id)?;
        Ok(self)
    }

    /// The REST adapter, or `None` until initialized.
    pub fn api(&self) -> Option<&CatApi> {
        self.api.as_ref()
    }

    /// The chat socket.
    pub fn socket(&self) -> &SocketSession {
        &self.session
    }

    /// The current configuration.
    pub fn config(&self) -> &CatConfig {
        &self.config
    }

    /// The configured user.
    pub fn user(&self) -> &str {
        &self.config.user
    }

    /// Change the user, then rebuild the socket and the REST adapter.
    pub fn set_user(&mut self, user: impl Into<String>) -> Result<&mut Self> {
        self.config.user = user.into();
        self.reset().init()
    }

    /// The configured authentication key.
    pub fn auth_key(&self) -> Option<&str> {
        self.config.auth_key.as_deref()
    }

    /// Change the authentication key, then rebuild the socket and the REST adapter.
    pub fn set_auth_key(&mut self, auth_key: impl Into<String>) -> Result<&mut Self> {
        self.config.auth_key = Some(auth_key.into());
        self.reset().init()
    }

    /// The chat socket URL.
    pub fn url(&self) -> String {
        self.config.websocket_config().url()
    }

    /// State of the chat socket.
    pub fn ready_state(&self) -> ReadyState {
        self.session.ready_state()
    }

    /// Set the handler called when the socket opens.
    pub fn on_connected<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.session.on_connected(handler);
        self
    }

    /// Set the handler called whenever the socket closes.
    pub fn on_disconnected<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.session.on_disconnected(handler);
        self
    }

    /// Set the handler for chat messages.
    pub fn on_message<F>(&self, handler: F) -> &Self
    where
        F: Fn(SocketMessage) + Send + Sync + 'static,
    {
        self.session.on_message(handler);
        self
    }

    /// Set the handler for socket errors.
    pub fn on_error<F>(&self, handler: F) -> &Self
    where
        F: Fn(SocketError) + Send + Sync + 'static,
    {
        self.session.on_error(handler);
        self
    }
}

impl Drop for CatClient {
    fn drop(&mut self) {
        self.session.close();
    }
}

impl std::fmt::Debug for CatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("initialized", &self.api.is_some())
            .finish()
    }
}
