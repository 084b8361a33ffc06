//! catline - a client for chat-agent servers.
//!
//! [`CatClient`] talks to a server over two channels:
//!
//! - a WebSocket chat session that reconnects after unexpected closes and
//!   dispatches chat messages and server errors to your handlers
//! - typed REST endpoints for server status, plugins and embedder settings
//!
//! # Example
//!
//! ```no_run
//! use catline::{CatClient, CatConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatClient::new(CatConfig::new("localhost").user("alice"))?;
//!     client.on_message(|message| println!("cat: {}", message.content));
//!
//!     if let Some(api) = client.api() {
//!         println!("server: {}", api.status().await?.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
mod client;
mod config;
mod error;
pub mod models;

pub use api::CatApi;
pub use client::CatClient;
pub use config::{CatConfig, WsSettings};
pub use error::{CatError, Result};

pub use catline_net::NetworkError;
pub use catline_net::websocket::{
    MessageKind, ReadyState, ServerError, SocketError, SocketMessage, SocketSession,
};
