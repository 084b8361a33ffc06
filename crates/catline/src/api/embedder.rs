//! Embedder configuration endpoints.

use catline_net::http::RestApiClient;
use serde::Serialize;

use super::fetch;
use crate::error::Result;
use crate::models::{Setting, SettingsResponse};

/// Endpoints under `/embedder`.
#[derive(Clone, Copy, Debug)]
pub struct EmbedderApi<'a> {
    rest: &'a RestApiClient,
}

impl<'a> EmbedderApi<'a> {
    pub(crate) fn new(rest: &'a RestApiClient) -> Self {
        Self { rest }
    }

    /// Every embedder configuration and the one currently selected.
    pub async fn settings(&self) -> Result<SettingsResponse> {
        fetch(self.rest.get("/embedder/settings")).await
    }

    /// Configuration of one embedder.
    pub async fn setting(&self, name: &str) -> Result<Setting> {
        fetch(
            self.rest
                .get("/embedder/settings/{languageEmbedderName}")
                .path_param("languageEmbedderName", name),
        )
        .await
    }

    /// Replace the configuration of one embedder and select it.
    pub async fn upsert_setting<T: Serialize>(
        &self,
        name: &str,
        settings: &T,
    ) -> Result<Setting> {
        fetch(
            self.rest
                .put("/embedder/settings/{languageEmbedderName}")
                .path_param("languageEmbedderName", name)
                .json(settings),
        )
        .await
    }
}
