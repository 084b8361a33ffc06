//! Plugin management endpoints.

use catline_net::http::{MultipartForm, RestApiClient};
use serde::Serialize;

use super::fetch;
use crate::error::Result;
use crate::models::{
    FileResponse, PluginDeleted, PluginDetails, PluginToggle, PluginsList, RegistryUpload,
    Setting, SettingsResponse,
};

/// Endpoints under `/plugins`.
#[derive(Clone, Copy, Debug)]
pub struct PluginsApi<'a> {
    rest: &'a RestApiClient,
}

impl<'a> PluginsApi<'a> {
    pub(crate) fn new(rest: &'a RestApiClient) -> Self {
        Self { rest }
    }

    /// Installed plugins and registry entries, optionally filtered by `query`.
    pub async fn list(&self, query: Option<&str>) -> Result<PluginsList> {
        fetch(self.rest.get("/plugins/").query_opt("query", query)).await
    }

    /// Install a plugin from an archive, sent as the multipart field `file`.
    pub async fn upload(
        &self,
        archive: impl Into<Vec<u8>>,
        filename: impl Into<String>,
    ) -> Result<FileResponse> {
        let filename = filename.into();
        let mime = archive_mime(&filename);
        let form = MultipartForm::new().file("file", archive, filename, mime)?;
        fetch(self.rest.post("/plugins/upload").multipart(form)).await
    }

    /// Install a plugin from the registry by its URL.
    pub async fn upload_from_registry(&self, url: &str) -> Result<RegistryUpload> {
        fetch(
            self.rest
                .post("/plugins/upload/registry")
                .json(&serde_json::json!({ "url": url })),
        )
        .await
    }

    /// Activate or deactivate a plugin.
    pub async fn toggle(&self, plugin_id: &str) -> Result<PluginToggle> {
        fetch(
            self.rest
                .put("/plugins/toggle/{plugin_id}")
                .path_param("plugin_id", plugin_id),
        )
        .await
    }

    /// Details of an installed plugin.
    pub async fn details(&self, plugin_id: &str) -> Result<PluginDetails> {
        fetch(
            self.rest
                .get("/plugins/{plugin_id}")
                .path_param("plugin_id", plugin_id),
        )
        .await
    }

    /// Uninstall a plugin.
    pub async fn delete(&self, plugin_id: &str) -> Result<PluginDeleted> {
        fetch(
            self.rest
                .delete("/plugins/{plugin_id}")
                .path_param("plugin_id", plugin_id),
        )
        .await
    }

    /// Settings of every installed plugin.
    pub async fn settings(&self) -> Result<SettingsResponse> {
        fetch(self.rest.get("/plugins/settings")).await
    }

    /// Settings of one plugin.
    pub async fn get_settings(&self, plugin_id: &str) -> Result<Setting> {
        fetch(
            self.rest
                .get("/plugins/settings/{plugin_id}")
                .path_param("plugin_id", plugin_id),
        )
        .await
    }

    /// Replace the settings of one plugin.
    pub async fn upsert_settings<T: Serialize>(
        &self,
        plugin_id: &str,
        settings: &T,
    ) -> Result<Setting> {
        fetch(
            self.rest
                .put("/plugins/settings/{plugin_id}")
                .path_param("plugin_id", plugin_id)
                .json(settings),
        )
        .await
    }
}

fn archive_mime(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".zip") {
        "application/zip"
    } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        "application/gzip"
    } else if lower.ends_with(".tar") {
        "application/x-tar"
    } else {
        "application/octet-stream"
    }
}
