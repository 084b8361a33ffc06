//! Reconnecting WebSocket chat session.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::config::{RetryDecision, WebSocketConfig};
use super::error::SocketError;
use super::frame::{InboundFrame, OutboundFrame, SocketMessage};
use super::state::ReadyState;
use crate::error::Result;
use crate::runtime;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type EventHandler = Arc<dyn Fn() + Send + Sync>;
type MessageHandler = Arc<dyn Fn(SocketMessage) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(SocketError) + Send + Sync>;

/// Command sent to the connection task.
enum Command {
    Send(String),
    Close,
}

/// One slot per event; registering replaces the previous handler.
#[derive(Default)]
struct Handlers {
    connected: Option<EventHandler>,
    disconnected: Option<EventHandler>,
    message: Option<MessageHandler>,
    error: Option<ErrorHandler>,
}

struct SessionInner {
    state: ReadyState,
    /// Unexpected closes since the last reset.
    retried: u32,
    explicitly_closed: bool,
    /// Identifies the current connection; bumped by every `connect()`.
    generation: u64,
    /// Whether a raw socket reference exists (set by connect, cleared by reset).
    has_socket: bool,
    command_tx: Option<mpsc::UnboundedSender<Command>>,
}

struct Shared {
    config: Mutex<WebSocketConfig>,
    inner: Mutex<SessionInner>,
    handlers: Mutex<Handlers>,
}

/// A single logical WebSocket connection to the chat endpoint.
///
/// The session connects to `ws[s]://<host>[:<port>]/<path>/<user>`, classifies
/// inbound text frames into chat messages and server errors, and reconnects
/// after unexpected closes according to its [`ReconnectConfig`].
///
/// Handlers are single-slot: registering a handler replaces the previous one
/// for that event. Handlers run on the runtime's tasks and are never called
/// while the session holds an internal lock, so they may call back into the
/// session (send, re-register, close).
///
/// The retry counter only goes back to zero on [`reset`](Self::reset); a
/// successful reconnect does not clear it.
///
/// # Example
///
/// ```ignore
/// use catline_net::websocket::{ReconnectConfig, SocketSession, WebSocketConfig};
///
/// let config = WebSocketConfig::new("localhost")
///     .port(1865)
///     .user_id("alice")
///     .reconnect_config(ReconnectConfig::new().retries(5));
///
/// let session = SocketSession::new(config);
/// session
///     .on_connected(|| println!("connected"))
///     .on_message(|message| println!("cat: {}", message.content))
///     .on_error(|error| eprintln!("{error}"));
///
/// session.connect();
/// session.send("Hello, cat!", None, None)?;
/// ```
///
/// [`ReconnectConfig`]: super::ReconnectConfig
#[derive(Clone)]
pub struct SocketSession {
    shared: Arc<Shared>,
}

impl SocketSession {
    /// Create a session. Nothing is opened until [`connect`](Self::connect).
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: Mutex::new(config),
                inner: Mutex::new(SessionInner {
                    state: ReadyState::Closed,
                    retried: 0,
                    explicitly_closed: false,
                    generation: 0,
                    has_socket: false,
                    command_tx: None,
                }),
                handlers: Mutex::new(Handlers::default()),
            }),
        }
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> WebSocketConfig {
        self.shared.config.lock().clone()
    }

    /// Replace the configuration. Takes effect on the next [`connect`](Self::connect).
    pub fn set_config(&self, config: WebSocketConfig) {
        *self.shared.config.lock() = config;
    }

    /// The URL the next connection will use.
    pub fn url(&self) -> String {
        self.shared.config.lock().url()
    }

    /// Current connection state; [`ReadyState::Closed`] when no socket exists.
    pub fn ready_state(&self) -> ReadyState {
        let inner = self.shared.inner.lock();
        if inner.has_socket {
            inner.state
        } else {
            ReadyState::Closed
        }
    }

    /// Check if the socket is open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Whether a socket exists (created by `connect`, discarded by `reset`).
    pub fn has_socket(&self) -> bool {
        self.shared.inner.lock().has_socket
    }

    /// Unexpected closes counted since the last reset.
    pub fn retries(&self) -> u32 {
        self.shared.inner.lock().retried
    }

    /// Number of connections opened by this session so far.
    pub fn generation(&self) -> u64 {
        self.shared.inner.lock().generation
    }

    /// Open the socket.
    ///
    /// Replaces any existing socket; the superseded connection is closed
    /// without notifying handlers. Completion is reported through
    /// [`on_connected`](Self::on_connected), failure through
    /// [`on_error`](Self::on_error) followed by the close handling.
    ///
    /// Runs on the ambient tokio runtime, or on a shared background runtime
    /// when called outside one.
    pub fn connect(&self) {
        let config = self.shared.config.lock().clone();
        let generation = {
            let mut inner = self.shared.inner.lock();
            inner.generation += 1;
            inner.state = ReadyState::Connecting;
            inner.explicitly_closed = false;
            inner.has_socket = true;
            // Dropping the sender makes the previous connection task shut down.
            inner.command_tx = None;
            inner.generation
        };

        tracing::debug!(target: "catline_net::websocket", url = %config.url(), generation, "Connecting");

        let shared = Arc::clone(&self.shared);
        runtime::spawn(run_connection(shared, generation, config));
    }

    /// Send a chat message.
    ///
    /// The frame is `{"text": message, "user_id": user, ...data}` where `user`
    /// defaults to the configured user. Returns an error, without sending,
    /// when `data` contains `text` or `user_id`. When the socket is not open
    /// nothing is sent and [`SocketError::SocketClosed`] goes to the error
    /// handler. Never blocks and never queues for later.
    pub fn send(
        &self,
        message: impl Into<String>,
        data: Option<Map<String, Value>>,
        user_id: Option<&str>,
    ) -> Result<&Self> {
        let user_id = match user_id {
            Some(user_id) => user_id.to_string(),
            None => self.shared.config.lock().user_id.clone(),
        };
        let frame = OutboundFrame::new(message, user_id, data)?;

        let tx = {
            let inner = self.shared.inner.lock();
            if inner.has_socket && inner.state == ReadyState::Open {
                inner.command_tx.clone()
            } else {
                None
            }
        };

        let Some(tx) = tx else {
            tracing::debug!(target: "catline_net::websocket", "Send attempted while socket is not open");
            self.shared.emit_error(SocketError::SocketClosed);
            return Ok(self);
        };

        if tx.send(Command::Send(frame.to_wire())).is_err() {
            self.shared.emit_error(SocketError::SocketClosed);
        }
        Ok(self)
    }

    /// Close the socket and suppress automatic reconnection. Idempotent.
    pub fn close(&self) -> &Self {
        let mut inner = self.shared.inner.lock();
        inner.explicitly_closed = true;
        if let Some(tx) = inner.command_tx.take() {
            let _ = tx.send(Command::Close);
        }
        if inner.has_socket && inner.state != ReadyState::Closed {
            inner.state = ReadyState::Closing;
        }
        drop(inner);
        self
    }

    /// Clear the retry counter, close, and discard the socket without reopening.
    ///
    /// A reconnect that was already scheduled is dropped.
    pub fn reset(&self) -> &Self {
        self.close();
        let mut inner = self.shared.inner.lock();
        inner.retried = 0;
        inner.has_socket = false;
        inner.state = ReadyState::Closed;
        inner.command_tx = None;
        drop(inner);
        self
    }

    /// Set the handler called when the socket opens.
    pub fn on_connected<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.handlers.lock().connected = Some(Arc::new(handler));
        self
    }

    /// Set the handler called after every close, once the retry decision is made.
    pub fn on_disconnected<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.handlers.lock().disconnected = Some(Arc::new(handler));
        self
    }

    /// Set the handler for chat messages.
    pub fn on_message<F>(&self, handler: F) -> &Self
    where
        F: Fn(SocketMessage) + Send + Sync + 'static,
    {
        self.shared.handlers.lock().message = Some(Arc::new(handler));
        self
    }

    /// Set the handler for runtime errors.
    pub fn on_error<F>(&self, handler: F) -> &Self
    where
        F: Fn(SocketError) + Send + Sync + 'static,
    {
        self.shared.handlers.lock().error = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for SocketSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketSession")
            .field("url", &self.url())
            .field("state", &self.ready_state())
            .field("retries", &self.retries())
            .finish()
    }
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().generation == generation
    }

    fn emit_connected(&self) {
        let handler = self.handlers.lock().connected.clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    fn emit_disconnected(&self) {
        let handler = self.handlers.lock().disconnected.clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    fn emit_message(&self, message: SocketMessage) {
        let handler = self.handlers.lock().message.clone();
        if let Some(handler) = handler {
            handler(message);
        }
    }

    fn emit_error(&self, error: SocketError) {
        let handler = self.handlers.lock().error.clone();
        match handler {
            Some(handler) => handler(error),
            None => {
                tracing::debug!(target: "catline_net::websocket", %error, "No error handler registered");
            }
        }
    }

    fn dispatch_text(&self, text: &str) {
        match InboundFrame::parse(text) {
            Ok(InboundFrame::Message(message)) => self.emit_message(message),
            Ok(InboundFrame::Error(error)) => self.emit_error(SocketError::Server(error)),
            Err(e) => {
                tracing::warn!(target: "catline_net::websocket", "Dropping malformed frame: {}", e);
                self.emit_error(SocketError::InvalidFrame(e.to_string()));
            }
        }
    }

    /// Close handling for connection `generation`: retry decision, then the disconnected handler.
    fn handle_close(self: &Arc<Self>, generation: u64) {
        let reconnect = self.config.lock().reconnect.clone();
        let decision = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return;
            }
            inner.state = ReadyState::Closed;
            inner.command_tx = None;
            if inner.explicitly_closed {
                None
            } else {
                inner.retried = inner.retried.saturating_add(1);
                Some(reconnect.decide(inner.retried))
            }
        };

        match decision {
            Some(RetryDecision::Reconnect(delay)) => {
                tracing::info!(target: "catline_net::websocket", ?delay, "Socket closed unexpectedly, reconnecting");
                self.schedule_reconnect(generation, delay);
            }
            Some(RetryDecision::Exhausted(retries)) => {
                tracing::warn!(target: "catline_net::websocket", retries, "Reconnect budget exhausted");
                let error = SocketError::FailedRetry { retries };
                if let Some(on_failed) = &reconnect.on_failed {
                    on_failed(&error);
                }
            }
            None => {
                tracing::debug!(target: "catline_net::websocket", "Socket closed");
            }
        }

        self.emit_disconnected();
    }

    fn schedule_reconnect(self: &Arc<Self>, generation: u64, delay: Duration) {
        let shared = Arc::clone(self);
        runtime::spawn(async move {
            tokio::time::sleep(delay).await;

            let wanted = {
                let inner = shared.inner.lock();
                inner.generation == generation && inner.has_socket && !inner.explicitly_closed
            };
            if wanted {
                SocketSession { shared }.connect();
            } else {
                tracing::debug!(target: "catline_net::websocket", "Discarding pending reconnect");
            }
        });
    }
}

async fn run_connection(shared: Arc<Shared>, generation: u64, config: WebSocketConfig) {
    match open(&config).await {
        Ok(mut stream) => {
            let (tx, rx) = mpsc::unbounded_channel();
            let opened = {
                let mut inner = shared.inner.lock();
                if inner.generation != generation {
                    return;
                }
                if inner.explicitly_closed {
                    false
                } else {
                    inner.state = ReadyState::Open;
                    inner.command_tx = Some(tx);
                    true
                }
            };

            if opened {
                tracing::info!(target: "catline_net::websocket", url = %config.url(), "Socket open");
                shared.emit_connected();
                pump(&shared, generation, stream, rx).await;
            } else {
                // closed while the handshake was in flight
                let _ = stream.close(None).await;
            }
        }
        Err(e) => {
            if !shared.is_current(generation) {
                return;
            }
            tracing::warn!(target: "catline_net::websocket", url = %config.url(), "Connection failed: {}", e);
            shared.emit_error(SocketError::Connection(e.to_string()));
        }
    }

    shared.handle_close(generation);
}

async fn open(config: &WebSocketConfig) -> Result<WsStream> {
    let request = build_request(config)?;
    let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
    Ok(stream)
}

async fn pump(
    shared: &Arc<Shared>,
    generation: u64,
    stream: WsStream,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                match cmd {
                    Some(Command::Send(text)) => {
                        if let Err(e) = write.send(Message::Text(text.into())).await {
                            if shared.is_current(generation) {
                                shared.emit_error(SocketError::Connection(e.to_string()));
                            }
                            break;
                        }
                    }
                    Some(Command::Close) | None => {
                        let _ = write.close().await;
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if shared.is_current(generation) {
                            shared.dispatch_text(text.as_str());
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(target: "catline_net::websocket", ?frame, "Server closed the socket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // binary, ping/pong and raw frames carry no chat payload
                    }
                    Some(Err(e)) => {
                        if shared.is_current(generation) {
                            shared.emit_error(SocketError::Connection(e.to_string()));
                        }
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}

/// Build the WebSocket request with custom headers.
fn build_request(config: &WebSocketConfig) -> Result<Request> {
    let mut request = config.url().into_client_request()?;

    let headers = request.headers_mut();
    for (name, value) in &config.headers {
        let header_name = http::header::HeaderName::try_from(name.as_str())?;
        let header_value = http::header::HeaderValue::try_from(value.as_str())?;
        headers.insert(header_name, header_value);
    }

    Ok(request)
}
