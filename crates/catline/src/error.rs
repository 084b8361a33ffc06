//! Error types for the client.

use catline_net::NetworkError;

use crate::models::HttpValidationError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, CatError>;

/// Errors returned by [`CatClient`](crate::CatClient) and the REST endpoints.
///
/// Runtime conditions of the chat socket are not returned here; they reach the
/// error handler as [`SocketError`](crate::SocketError).
#[derive(Debug, thiserror::Error)]
pub enum CatError {
    /// Transport failure, undeclared error status, or a rejected argument.
    #[error(transparent)]
    Network(NetworkError),

    /// The server rejected the request (HTTP 422).
    #[error("Validation Error: {0}")]
    Validation(HttpValidationError),
}

impl CatError {
    /// The HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(err) => err.status(),
            Self::Validation(_) => Some(422),
        }
    }
}

impl From<NetworkError> for CatError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Api {
                status: 422,
                description,
                body: Some(body),
            } => match serde_json::from_value::<HttpValidationError>(body.clone()) {
                Ok(validation) => Self::Validation(validation),
                Err(_) => Self::Network(NetworkError::Api {
                    status: 422,
                    description,
                    body: Some(body),
                }),
            },
            other => Self::Network(other),
        }
    }
}
