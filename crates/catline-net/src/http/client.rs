//! The HTTP transport.

use std::sync::Arc;
use std::time::Duration;

use super::request::{HttpRequest, RequestBody};
use super::response::HttpResponse;
use crate::error::Result;

/// Settings the transport was built with.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Whole-request timeout; `None` waits forever.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: format!("catline/{} (Rust)", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Never time out whole requests.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder().user_agent(&self.config.user_agent);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client: builder.build()?,
                config: self.config,
            }),
        })
    }
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// Executes [`HttpRequest`]s over a shared connection pool.
///
/// Cheap to clone; clones share the pool and configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Send `request` and return the response, whatever its status.
    ///
    /// Dropping the returned future cancels the request.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut url = url::Url::parse(&request.url)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        tracing::debug!(target: "catline_net::http", method = %request.method, %url, "Sending request");

        let mut builder = self
            .inner
            .client
            .request(request.method.to_reqwest(), url)
            .headers(request.headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()),
        };

        let response = builder.send().await?;
        Ok(HttpResponse::from_reqwest(response))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
