//! Request pipeline of the agent: load the stored collector configuration, edit it and save it.
use crate::collector_config::transfer_metrics::TransferMetricsPipeline;
use crate::collector_config::{CollectorConfig, ConfigPatch};
use crate::store::{DocumentLocator, DocumentStore, SaveOutcome, StoreError};
use serde_yaml::Mapping;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Pipeline '{0}' not found")]
    PipelineNotFound(String),
}

/// Result of an edit. When the store skipped persistence (debug mode) the caller is handed the
/// resulting document instead.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub persisted: bool,
    pub document: CollectorConfig,
}

pub struct ConfigurationService<S> {
    store: S,
    conflict_retries: u32,
}

impl<S> ConfigurationService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S, conflict_retries: u32) -> Self {
        Self {
            store,
            conflict_retries,
        }
    }

    /// Adds (or replaces) the components and pipelines in `patch`.
    pub fn add(
        &self,
        locator: &DocumentLocator,
        patch: &ConfigPatch,
    ) -> Result<MutationOutcome, ServiceError> {
        self.mutate(locator, |document| {
            document.apply_add(patch.clone());
            Ok(())
        })
    }

    /// Deep merges `patch` into the stored configuration.
    pub fn update(
        &self,
        locator: &DocumentLocator,
        patch: &ConfigPatch,
    ) -> Result<MutationOutcome, ServiceError> {
        self.mutate(locator, |document| {
            document.apply_update(patch.clone());
            Ok(())
        })
    }

    /// Removes whatever `spec` matches and prunes the emptied entries.
    pub fn remove(
        &self,
        locator: &DocumentLocator,
        spec: &ConfigPatch,
    ) -> Result<MutationOutcome, ServiceError> {
        self.mutate(locator, |document| {
            document.apply_removal(spec);
            Ok(())
        })
    }

    pub fn pipeline_names(&self, locator: &DocumentLocator) -> Result<Vec<String>, ServiceError> {
        Ok(self.document(locator)?.pipeline_names())
    }

    pub fn document(&self, locator: &DocumentLocator) -> Result<CollectorConfig, ServiceError> {
        Ok(self.store.load(locator)?.document)
    }

    pub fn add_transfer_metrics(
        &self,
        locator: &DocumentLocator,
        pipeline: &TransferMetricsPipeline,
        exporter_endpoint: &str,
    ) -> Result<MutationOutcome, ServiceError> {
        self.add(locator, &pipeline.add_patch(exporter_endpoint))
    }

    pub fn update_transfer_metrics(
        &self,
        locator: &DocumentLocator,
        pipeline: &TransferMetricsPipeline,
        new_exporter: Option<&str>,
        new_processors: Option<&Mapping>,
    ) -> Result<MutationOutcome, ServiceError> {
        self.mutate(locator, |document| {
            ensure_pipeline(document, pipeline)?;
            document.apply_add(pipeline.update_patch(new_exporter, new_processors.cloned()));
            Ok(())
        })
    }

    pub fn delete_transfer_metrics(
        &self,
        locator: &DocumentLocator,
        pipeline: &TransferMetricsPipeline,
    ) -> Result<MutationOutcome, ServiceError> {
        self.mutate(locator, |document| {
            ensure_pipeline(document, pipeline)?;
            let spec = pipeline.removal_spec(document);
            document.apply_removal(&spec);
            Ok(())
        })
    }

    /// Runs the load, edit and save cycle, starting over when the document changed between the
    /// load and the save.
    fn mutate<F>(
        &self,
        locator: &DocumentLocator,
        edit: F,
    ) -> Result<MutationOutcome, ServiceError>
    where
        F: Fn(&mut CollectorConfig) -> Result<(), ServiceError>,
    {
        let mut attempt = 0;
        loop {
            let mut stored = self.store.load(locator)?;
            edit(&mut stored.document)?;

            match self.store.save(locator, &stored) {
                Ok(outcome) => {
                    let persisted = outcome == SaveOutcome::Persisted;
                    info!(%locator, persisted, "collector config updated");
                    return Ok(MutationOutcome {
                        persisted,
                        document: stored.document,
                    });
                }
                Err(StoreError::Conflict(err)) if attempt < self.conflict_retries => {
                    attempt += 1;
                    warn!(%locator, attempt, error_msg = %err, "concurrent change, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn ensure_pipeline(
    document: &CollectorConfig,
    pipeline: &TransferMetricsPipeline,
) -> Result<(), ServiceError> {
    let name = pipeline.pipeline_name();
    if document.pipeline(&name).is_none() {
        debug!(pipeline = %name, "pipeline not present in the collector config");
        return Err(ServiceError::PipelineNotFound(name));
    }
    Ok(())
}
