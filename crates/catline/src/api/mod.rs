//! Typed REST endpoints of the server.
//!
//! [`CatApi`] is the transport adapter of a [`CatClient`](crate::CatClient):
//! a [`RestApiClient`] bound to the server's base URL and identity headers.
//! Endpoints are grouped into services borrowed from it.
//!
//! ```ignore
//! let api = client.api().expect("client is initialized");
//!
//! let status = api.status().await?;
//! let plugins = api.plugins().list(Some("weather")).await?;
//! api.plugins().toggle("weather_plugin").await?;
//! let embedders = api.embedder().settings().await?;
//! ```

mod embedder;
mod plugins;
mod status;

pub use embedder::EmbedderApi;
pub use plugins::PluginsApi;

use catline_net::http::{HttpClient, RestApiClient, RestApiRequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::CatConfig;
use crate::error::Result;

/// Description attached to the 422 status every endpoint declares.
const VALIDATION_ERROR: &str = "Validation Error";

/// REST transport adapter.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct CatApi {
    rest: RestApiClient,
}

impl CatApi {
    /// Build an adapter for the configured server.
    ///
    /// Fails when the base URL or an identity header is invalid.
    pub fn new(config: &CatConfig) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;

        let mut builder = RestApiClient::builder(config.http_base_url())
            .http_client(http_client)
            .accept_json();
        for (name, value) in config.headers() {
            builder = builder.default_header(name, value)?;
        }

        Ok(Self {
            rest: builder.build()?,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    /// The underlying REST client, for endpoints without a typed wrapper.
    pub fn rest(&self) -> &RestApiClient {
        &self.rest
    }

    /// Plugin management endpoints.
    pub fn plugins(&self) -> PluginsApi<'_> {
        PluginsApi::new(&self.rest)
    }

    /// Embedder configuration endpoints.
    pub fn embedder(&self) -> EmbedderApi<'_> {
        EmbedderApi::new(&self.rest)
    }
}

/// Send `request` with the declared validation status and decode the JSON reply.
async fn fetch<T: DeserializeOwned>(request: RestApiRequestBuilder) -> Result<T> {
    Ok(request
        .error(422, VALIDATION_ERROR)
        .json_response()
        .await?)
}
