use super::{
    DocumentLocator, DocumentStore, DocumentVersion, SaveOutcome, StoreError, StoredDocument,
};
use crate::collector_config::CollectorConfig;
use std::path::PathBuf;
use tracing::{debug, info};

/// Serves a collector configuration from a local YAML file and never writes it back.
/// Used when no Kubernetes cluster is reachable (debug mode).
#[derive(Debug, Clone)]
pub struct FixtureStore {
    path: PathBuf,
}

impl FixtureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentStore for FixtureStore {
    fn load(&self, locator: &DocumentLocator) -> Result<StoredDocument, StoreError> {
        debug!(%locator, path = %self.path.display(), "loading fixture document");
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            StoreError::Unavailable(format!(
                "reading fixture {}: {err}",
                self.path.display()
            ))
        })?;
        Ok(StoredDocument {
            document: CollectorConfig::try_from(content.as_str())?,
            version: DocumentVersion::Fixture,
        })
    }

    fn save(
        &self,
        locator: &DocumentLocator,
        _stored: &StoredDocument,
    ) -> Result<SaveOutcome, StoreError> {
        info!(%locator, "debug mode, skipping persistence of the collector config");
        Ok(SaveOutcome::Skipped)
    }
}
