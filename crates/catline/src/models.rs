//! Request and response shapes of the REST endpoints.
//!
//! Fields the server may omit default to empty values, and fields not modelled
//! here are kept in `extra` so nothing the server sends is lost.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server status returned by `GET /`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A plugin, either installed or offered by the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Only reported for installed plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters echoed back by the plugin listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginFilters {
    #[serde(default)]
    pub query: Option<String>,
}

/// Result of `GET /plugins/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginsList {
    #[serde(default)]
    pub filters: PluginFilters,
    #[serde(default)]
    pub installed: Vec<Plugin>,
    #[serde(default)]
    pub registry: Vec<Plugin>,
}

/// Result of a plugin archive upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileResponse {
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub info: String,
}

/// Result of installing a plugin from the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryUpload {
    pub url: String,
    #[serde(default)]
    pub info: String,
}

/// Result of toggling a plugin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginToggle {
    pub info: String,
}

/// Result of `GET /plugins/{plugin_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginDetails {
    pub data: Plugin,
}

/// Result of deleting a plugin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginDeleted {
    pub deleted: String,
}

/// A named settings object, with its JSON schema when the server provides one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// A list of settings objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub settings: Vec<Setting>,
    /// Currently selected configuration, for factories such as the embedder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_configuration: Option<String>,
}

/// One failed check of a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location of the offending value, e.g. `["body", "url"]`.
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Body of a 422 response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpValidationError {
    #[serde(default)]
    pub detail: Vec<ValidationError>,
}

impl std::fmt::Display for HttpValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.detail.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            let loc: Vec<String> = error
                .loc
                .iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            if loc.is_empty() {
                f.write_str(&error.msg)?;
            } else {
                write!(f, "{}: {}", loc.join("."), error.msg)?;
            }
        }
        Ok(())
    }
}
