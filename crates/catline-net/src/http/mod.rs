//! HTTP transport for catline.
//!
//! [`HttpClient`] executes fully resolved [`HttpRequest`]s over `reqwest`.
//! [`RestApiClient`] builds those requests from a base URL, default headers,
//! path templates and declared error statuses. Every request future can be
//! cancelled by dropping it.
//!
//! # Example
//!
//! ```ignore
//! use catline_net::http::RestApiClient;
//!
//! let api = RestApiClient::builder("http://localhost:1865")
//!     .default_header("user_id", "alice")?
//!     .accept_json()
//!     .build()?;
//!
//! let status: serde_json::Value = api.get("/").json_response().await?;
//! ```

mod client;
mod request;
mod response;
mod rest_api;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
pub use response::HttpResponse;
pub use rest_api::{RestApiClient, RestApiClientBuilder, RestApiRequestBuilder};
