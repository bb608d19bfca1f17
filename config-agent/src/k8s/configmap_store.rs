#[cfg_attr(test, mockall_double::double)]
use super::client::SyncK8sClient;
use super::Error;
use crate::collector_config::CollectorConfig;
use crate::store::{
    DocumentLocator, DocumentStore, DocumentVersion, SaveOutcome, StoreError, StoredDocument,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Kubernetes persistent store of the collector configuration.
/// The document is stored as YAML text under a single key of the ConfigMap data.
pub struct ConfigMapStore {
    k8s_client: Arc<SyncK8sClient>,
    key: String,
}

impl ConfigMapStore {
    pub fn new(k8s_client: Arc<SyncK8sClient>, key: String) -> Self {
        Self { k8s_client, key }
    }
}

impl DocumentStore for ConfigMapStore {
    fn load(&self, locator: &DocumentLocator) -> Result<StoredDocument, StoreError> {
        let stored = self
            .k8s_client
            .get_configmap_key(&locator.name, &locator.namespace, &self.key)?
            .ok_or_else(|| {
                StoreError::NotFound(format!("configmap {locator} with key {}", self.key))
            })?;
        debug!(%locator, resource_version = %stored.resource_version, "collector config loaded");

        Ok(StoredDocument {
            document: CollectorConfig::try_from(stored.value.as_str())?,
            version: DocumentVersion::ResourceVersion(stored.resource_version),
        })
    }

    fn save(
        &self,
        locator: &DocumentLocator,
        stored: &StoredDocument,
    ) -> Result<SaveOutcome, StoreError> {
        let DocumentVersion::ResourceVersion(resource_version) = &stored.version else {
            warn!(%locator, "document was not loaded from the cluster, skipping persistence");
            return Ok(SaveOutcome::Skipped);
        };
        let content = String::try_from(&stored.document)?;
        self.k8s_client.replace_configmap_key(
            &locator.name,
            &locator.namespace,
            &self.key,
            &content,
            resource_version,
        )?;
        debug!(%locator, "collector config persisted");
        Ok(SaveOutcome::Persisted)
    }
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Conflict(msg) => StoreError::Conflict(msg),
            Error::ConfigMapNotFound(name) => StoreError::NotFound(format!("configmap {name}")),
            err @ Error::Rejected { .. } => StoreError::Rejected(err.to_string()),
            err @ (Error::KubeRs(_) | Error::UnableToSetupClientKubeconfig(_)) => {
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}
