//! Reconnecting WebSocket chat session.
//!
//! A [`SocketSession`] owns one logical connection to a chat endpoint:
//! - `ws://` and `wss://` endpoints built from host, port, path and user
//! - custom handshake headers for authentication
//! - JSON chat frames out, classified chat messages and server errors in
//! - fixed-delay reconnection with a retry limit and an exhaustion callback
//! - single-slot event handlers
//!
//! # Example
//!
//! ```ignore
//! use catline_net::websocket::{SocketSession, WebSocketConfig};
//!
//! let session = SocketSession::new(
//!     WebSocketConfig::new("localhost").port(1865).user_id("alice"),
//! );
//!
//! session.on_connected(|| println!("Connected to server!"));
//! session.on_message(|message| println!("Received: {}", message.content));
//! session.on_disconnected(|| println!("Disconnected from server"));
//!
//! session.connect();
//! session.send("Hello, cat!", None, None)?;
//! ```

mod config;
mod error;
mod frame;
mod session;
mod state;

pub use config::{FailedCallback, ReconnectConfig, RetryDecision, WebSocketConfig};
pub use error::SocketError;
pub use frame::{InboundFrame, MessageKind, OutboundFrame, RESERVED_KEYS, ServerError, SocketMessage};
pub use session::SocketSession;
pub use state::ReadyState;
