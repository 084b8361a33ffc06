//! Connection state of a socket session.

/// Current state of the session's socket.
///
/// Mirrors the four states of the underlying connection. A session that has
/// never connected, or whose socket was discarded by a reset, reports
/// [`ReadyState::Closed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ReadyState {
    /// The opening handshake is in progress.
    Connecting,
    /// Connected; frames can be sent and received.
    Open,
    /// A close was requested and the closing handshake is in progress.
    Closing,
    /// Not connected.
    #[default]
    Closed,
}

impl ReadyState {
    /// Numeric value used by browser WebSocket APIs (0 to 3).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closing => 2,
            Self::Closed => 3,
        }
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}
