//! Networking layer for catline.
//!
//! This crate provides the transports a chat client needs:
//!
//! - **HTTP Client**: async transport for JSON and multipart requests
//! - **REST API Client**: base URL, default headers, path parameters and
//!   declared error statuses on top of the HTTP client
//! - **WebSocket**: a reconnecting chat session with message classification
//!
//! # HTTP Client
//!
//! ```ignore
//! use catline_net::http::{HttpClient, HttpMethod, HttpRequest, MultipartForm, RequestBody};
//!
//! let client = HttpClient::builder().timeout(Duration::from_secs(10)).build()?;
//!
//! let mut request = HttpRequest::new(HttpMethod::Post, "http://localhost:1865/plugins/upload");
//! request.body = RequestBody::Multipart(
//!     MultipartForm::new().file("file", archive, "plugin.zip", "application/zip")?,
//! );
//! let response = client.execute(request).await?;
//! ```
//!
//! # REST API Client
//!
//! ```ignore
//! use catline_net::http::RestApiClient;
//!
//! let api = RestApiClient::builder("http://localhost:1865")
//!     .default_header("access_token", "secret")?
//!     .build()?;
//!
//! let details: serde_json::Value = api
//!     .get("/plugins/{plugin_id}")
//!     .path_param("plugin_id", "core_plugin")
//!     .error(422, "Validation Error")
//!     .json_response()
//!     .await?;
//! ```
//!
//! # WebSocket
//!
//! See [`websocket::SocketSession`].

mod error;
pub mod http;
pub mod runtime;
pub mod websocket;

pub use error::{NetworkError, Result};

// Re-export commonly used types at the crate root
pub use http::{
    HttpClient, HttpClientBuilder, HttpMethod, HttpRequest, HttpResponse, MultipartForm,
    RequestBody, RestApiClient, RestApiClientBuilder,
};
pub use websocket::{
    ReadyState, ReconnectConfig, SocketError, SocketMessage, SocketSession, WebSocketConfig,
};
