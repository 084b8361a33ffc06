//! Requests as the transport sends them.

use std::time::Duration;

use bytes::Bytes;

use crate::error::{NetworkError, Result};

/// Methods the REST endpoints use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as `application/json`.
    Json(serde_json::Value),
    /// Sent as-is.
    Bytes(Bytes),
    /// Sent as `multipart/form-data`.
    Multipart(MultipartForm),
}

/// A fully resolved request: absolute URL, headers, query pairs and body.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: http::HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Overrides the client's timeout for this request.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// A bodiless request with no headers.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: http::HeaderMap::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }
}

/// A `multipart/form-data` body.
///
/// Keeps the field names so a built request can still be inspected.
pub struct MultipartForm {
    form: reqwest::multipart::Form,
    fields: Vec<String>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            form: reqwest::multipart::Form::new(),
            fields: Vec::new(),
        }
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.fields.push(name.clone());
        self.form = self.form.text(name, value.into());
        self
    }

    /// Add a file field.
    ///
    /// Fails if `mime` is not a valid media type.
    pub fn file(
        mut self,
        name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        mime: &str,
    ) -> Result<Self> {
        let part = reqwest::multipart::Part::bytes(contents.into())
            .file_name(filename.into())
            .mime_str(mime)
            .map_err(|e| NetworkError::Request(format!("invalid media type {mime:?}: {e}")))?;
        let name = name.into();
        self.fields.push(name.clone());
        self.form = self.form.part(name, part);
        Ok(self)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub(crate) fn into_reqwest(self) -> reqwest::multipart::Form {
        self.form
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MultipartForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartForm")
            .field("fields", &self.fields)
            .finish()
    }
}
