//! REST API client helpers.
//!
//! [`RestApiClient`] wraps an [`HttpClient`] with a base URL, default headers,
//! `{name}` path templates and per-endpoint declared error statuses. It never
//! retries; a failed request is reported once.
//!
//! # Example
//!
//! ```ignore
//! use catline_net::http::RestApiClient;
//!
//! let client = RestApiClient::builder("http://localhost:1865")
//!     .default_header("user_id", "alice")?
//!     .build()?;
//!
//! let plugin: serde_json::Value = client
//!     .get("/plugins/{plugin_id}")
//!     .path_param("plugin_id", "core_plugin")
//!     .error(422, "Validation Error")
//!     .json_response()
//!     .await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use super::client::HttpClient;
use super::request::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
use super::response::HttpResponse;
use crate::error::{NetworkError, Result};

/// Builder for [`RestApiClient`].
pub struct RestApiClientBuilder {
    base_url: String,
    http_client: Option<HttpClient>,
    headers: http::HeaderMap,
}

impl RestApiClientBuilder {
    /// Start a builder; request paths are appended to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: None,
            headers: http::HeaderMap::new(),
        }
    }

    /// Share an existing transport instead of building a default one.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Attach a header to every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader(format!("invalid value for {name}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Ask for JSON responses.
    pub fn accept_json(mut self) -> Self {
        self.headers.insert(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Fails when the base URL does not parse.
    pub fn build(self) -> Result<RestApiClient> {
        url::Url::parse(&self.base_url)?;
        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpClient::builder().build()?,
        };

        Ok(RestApiClient {
            inner: Arc::new(RestApiClientInner {
                http_client,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                headers: self.headers,
            }),
        })
    }
}

struct RestApiClientInner {
    http_client: HttpClient,
    base_url: String,
    headers: http::HeaderMap,
}

/// A REST API client bound to a base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RestApiClient {
    inner: Arc<RestApiClientInner>,
}

impl RestApiClient {
    pub fn builder(base_url: impl Into<String>) -> RestApiClientBuilder {
        RestApiClientBuilder::new(base_url)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> &http::HeaderMap {
        &self.inner.headers
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.inner.http_client
    }

    pub fn get(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Get, path)
    }

    pub fn post(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Post, path)
    }

    pub fn put(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Put, path)
    }

    pub fn delete(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Delete, path)
    }

    /// Start a request to `path`, relative to the base URL.
    ///
    /// `path` may contain `{name}` placeholders filled by
    /// [`RestApiRequestBuilder::path_param`].
    pub fn request(&self, method: HttpMethod, path: &str) -> RestApiRequestBuilder {
        RestApiRequestBuilder {
            client: self.clone(),
            method,
            path: format!("/{}", path.trim_start_matches('/')),
            path_params: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            body_error: None,
            timeout: None,
            errors: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RestApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestApiClient")
            .field("base_url", &self.inner.base_url)
            .field("headers", &self.inner.headers.len())
            .finish()
    }
}

/// One request against a [`RestApiClient`].
pub struct RestApiRequestBuilder {
    client: RestApiClient,
    method: HttpMethod,
    path: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: RequestBody,
    body_error: Option<NetworkError>,
    timeout: Option<Duration>,
    errors: Vec<(u16, String)>,
}

impl RestApiRequestBuilder {
    /// Fill the `{name}` placeholder of the path template.
    ///
    /// The value is percent-encoded as a single path segment.
    pub fn path_param(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.path_params
            .push((name.into(), urlencoding::encode(value.as_ref()).into_owned()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Send `body` as JSON.
    ///
    /// A body that fails to serialize makes [`build`](Self::build) and
    /// [`send`](Self::send) fail with [`NetworkError::Json`].
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = RequestBody::Json(value);
                self.body_error = None;
            }
            Err(e) => self.body_error = Some(e.into()),
        }
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self.body_error = None;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Declare an error status this endpoint is documented to return.
    ///
    /// A response with this status fails with [`NetworkError::Api`], carrying
    /// `description` and the decoded body.
    pub fn error(mut self, status: u16, description: impl Into<String>) -> Self {
        self.errors.push((status, description.into()));
        self
    }

    /// Resolve the request without sending it.
    ///
    /// Fails if the path template still holds an unfilled placeholder or the
    /// JSON body could not be serialized.
    pub fn build(self) -> Result<HttpRequest> {
        Ok(self.resolve()?.0)
    }

    /// Send the request and return the 2xx response.
    ///
    /// Declared statuses become [`NetworkError::Api`], any other non-2xx
    /// status [`NetworkError::HttpStatus`].
    pub async fn send(self) -> Result<HttpResponse> {
        let client = self.client.clone();
        let (request, errors) = self.resolve()?;
        let method = request.method;
        let url = request.url.clone();

        let response = client.http_client().execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status();
        tracing::warn!(target: "catline_net::http", %method, %url, status, "Request failed");

        match errors.into_iter().find(|(code, _)| *code == status) {
            Some((_, description)) => {
                let text = response.text().await.unwrap_or_default();
                let body = match serde_json::from_str(&text) {
                    Ok(value) => Some(value),
                    Err(_) if text.is_empty() => None,
                    Err(_) => Some(serde_json::Value::String(text)),
                };
                Err(NetworkError::Api {
                    status,
                    description,
                    body,
                })
            }
            None => response.error_for_status_with_body().await,
        }
    }

    /// Send the request and decode the 2xx body as JSON.
    pub async fn json_response<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.json().await
    }

    fn resolve(self) -> Result<(HttpRequest, Vec<(u16, String)>)> {
        if let Some(error) = self.body_error {
            return Err(error);
        }
        let path = substitute_path(&self.path, &self.path_params)?;
        let url = format!("{}{}", self.client.base_url(), path);
        let mut request = HttpRequest::new(self.method, url);
        request.headers = self.client.default_headers().clone();
        request.query = self.query;
        request.body = self.body;
        request.timeout = self.timeout;
        Ok((request, self.errors))
    }
}

/// Replace every `{name}` placeholder in `template` with its (already encoded) value.
fn substitute_path(template: &str, params: &[(String, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| NetworkError::MissingPathParam(name.to_string()))?;
        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
