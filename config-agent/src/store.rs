//! Persistence of the collector configuration document.
use crate::collector_config::{CollectorConfig, CollectorConfigError};
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

pub mod fallback;
pub mod fixture;

/// Identifies the document to read or write: a ConfigMap in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocator {
    pub namespace: String,
    pub name: String,
}

impl Display for DocumentLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Opaque token identifying the stored revision a document was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentVersion {
    /// Kubernetes `resourceVersion` of the ConfigMap.
    ResourceVersion(String),
    /// The document comes from the local fixture and is never written back.
    Fixture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: CollectorConfig,
    pub version: DocumentVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Persisted,
    /// Nothing was written, the caller gets the resulting document instead.
    Skipped,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document modified concurrently: {0}")]
    Conflict(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but refused the operation, e.g. missing permissions.
    #[error("store rejected the operation: {0}")]
    Rejected(String),

    #[error("invalid stored document: {0}")]
    InvalidDocument(#[from] CollectorConfigError),
}

/// Loads and saves collector configuration documents.
///
/// `save` is conditioned on the version the document was loaded with and fails with
/// [StoreError::Conflict] when the stored document changed in the meantime.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore {
    fn load(&self, locator: &DocumentLocator) -> Result<StoredDocument, StoreError>;

    fn save(
        &self,
        locator: &DocumentLocator,
        stored: &StoredDocument,
    ) -> Result<SaveOutcome, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn load(&self, locator: &DocumentLocator) -> Result<StoredDocument, StoreError> {
        self.as_ref().load(locator)
    }

    fn save(
        &self,
        locator: &DocumentLocator,
        stored: &StoredDocument,
    ) -> Result<SaveOutcome, StoreError> {
        self.as_ref().save(locator, stored)
    }
}

const DEFAULT_CONFLICT_RETRIES: u32 = 3;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Extra load, edit and save cycles attempted when the stored document changed concurrently.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

fn default_conflict_retries() -> u32 {
    DEFAULT_CONFLICT_RETRIES
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}
