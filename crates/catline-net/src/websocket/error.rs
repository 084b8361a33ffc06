//! Errors delivered to a session's error handler.

use super::frame::ServerError;

/// A runtime condition reported through [`SocketSession::on_error`] or the
/// exhaustion callback.
///
/// These are never returned from session methods; see
/// [`NetworkError`](crate::NetworkError) for the synchronous failures.
///
/// [`SocketSession::on_error`]: super::SocketSession::on_error
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SocketError {
    /// A send was attempted while the socket was not open.
    #[error("SocketClosed: The connection to the server was closed")]
    SocketClosed,

    /// The transport failed (handshake, I/O, protocol).
    #[error("WebSocketConnectionError: {0}")]
    Connection(String),

    /// The server sent an error frame.
    #[error("{}: {}", .0.name, .0.description)]
    Server(ServerError),

    /// The reconnect budget is spent.
    #[error("FailedRetry: Failed to connect WebSocket after {retries} retries.")]
    FailedRetry {
        /// The retry limit that was reached.
        retries: u32,
    },

    /// A text frame that is not JSON.
    #[error("InvalidFrame: {0}")]
    InvalidFrame(String),
}

impl SocketError {
    /// Short error name, as it would appear in a `name` field.
    pub fn name(&self) -> &str {
        match self {
            Self::SocketClosed => "SocketClosed",
            Self::Connection(_) => "WebSocketConnectionError",
            Self::Server(error) => &error.name,
            Self::FailedRetry { .. } => "FailedRetry",
            Self::InvalidFrame(_) => "InvalidFrame",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            Self::SocketClosed => "The connection to the server was closed".to_string(),
            Self::Connection(detail) => {
                format!("Something went wrong while connecting to the server: {detail}")
            }
            Self::Server(error) => error.description.clone(),
            Self::FailedRetry { retries } => {
                format!("Failed to connect WebSocket after {retries} retries.")
            }
            Self::InvalidFrame(detail) => format!("Received a frame that is not JSON: {detail}"),
        }
    }
}
