//! Responses as the transport returns them.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};

/// A received response whose body has not been read yet.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self { inner: response }
    }

    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner
            .headers()
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.inner.bytes().await?)
    }

    /// Decode the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.inner.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Pass 2xx responses through; turn anything else into
    /// [`NetworkError::HttpStatus`] carrying the body text.
    pub async fn error_for_status_with_body(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = self.text().await.ok().filter(|body| !body.is_empty());
        Err(NetworkError::HttpStatus { status, message })
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish()
    }
}
