//! Request and response bodies of the HTTP API.
use crate::collector_config::{CollectorConfig, ConfigPatch};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Partial collector configuration plus the optional ConfigMap it applies to.
/// The four sections are mandatory, even if empty.
#[derive(Debug, Deserialize)]
pub struct ConfigurationRequest {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub configmap_name: Option<String>,
    #[serde(flatten)]
    pub patch: ConfigPatch,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigurationQuery {
    #[serde(default)]
    pub full: bool,
    pub namespace: Option<String>,
    pub configmap_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetricsRequest {
    pub prometheus_exporter: String,
    #[serde(rename = "domainID")]
    pub domain_id: String,
    #[serde(rename = "flavorID")]
    pub flavor_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub configmap_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferMetricsRequest {
    #[serde(rename = "domainID")]
    pub domain_id: String,
    #[serde(rename = "flavorID")]
    pub flavor_id: String,
    #[serde(default)]
    pub new_exporter: Option<String>,
    #[serde(default)]
    pub new_processors: Option<Mapping>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub configmap_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferMetricsSelector {
    #[serde(rename = "domainID")]
    pub domain_id: String,
    #[serde(rename = "flavorID")]
    pub flavor_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub configmap_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub label_selector: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    /// Resulting document, only present when it could not be persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<CollectorConfig>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            configuration: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PipelinesResponse {
    pub pipelines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationResponse {
    pub configuration: CollectorConfig,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
