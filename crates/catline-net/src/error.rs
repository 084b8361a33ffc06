//! Error types for the networking layer.

use std::fmt;

/// Errors returned synchronously by networking operations.
///
/// Runtime conditions of a live socket (closed sockets, transport failures,
/// server-reported errors) are not returned here; they are delivered to the
/// session's error handler as [`SocketError`](crate::websocket::SocketError).
#[derive(Debug, Clone)]
pub enum NetworkError {
    /// HTTP request failed.
    Request(String),
    /// Invalid URL provided.
    InvalidUrl(String),
    /// Request timed out.
    Timeout,
    /// Connection refused or failed.
    Connection(String),
    /// Invalid header name or value.
    InvalidHeader(String),
    /// JSON serialization/deserialization error.
    Json(String),
    /// HTTP error status (4xx or 5xx) that the endpoint did not declare.
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Optional error message from the response body.
        message: Option<String>,
    },
    /// An error status the endpoint declared, with its decoded body.
    Api {
        /// The HTTP status code.
        status: u16,
        /// Description registered for this status.
        description: String,
        /// Response body, parsed as JSON when possible.
        body: Option<serde_json::Value>,
    },
    /// A path parameter referenced by the URL template was never supplied.
    MissingPathParam(String),
    /// Extra send data tried to override a reserved frame key.
    ReservedKey(String),
    /// WebSocket error.
    WebSocket(String),
}

impl NetworkError {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(msg) => write!(f, "HTTP request error: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Connection(msg) => write!(f, "Connection error: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "Invalid header: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::HttpStatus { status, message } => {
                if let Some(msg) = message {
                    write!(f, "HTTP {status}: {msg}")
                } else {
                    write!(f, "HTTP {status}")
                }
            }
            Self::Api {
                status,
                description,
                ..
            } => write!(f, "HTTP {status}: {description}"),
            Self::MissingPathParam(name) => write!(f, "Missing path parameter: {name}"),
            Self::ReservedKey(key) => write!(
                f,
                "The object cannot have properties named \"text\" or \"user_id\" (found \"{key}\")"
            ),
            Self::WebSocket(msg) => write!(f, "WebSocket error: {msg}"),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for NetworkError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for NetworkError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for NetworkError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
