use super::fixture::FixtureStore;
use super::{
    DocumentLocator, DocumentStore, DocumentVersion, SaveOutcome, StoreError, StoredDocument,
};
use tracing::warn;

/// Wraps a store and serves the local fixture whenever it is unavailable.
/// Documents coming from the fixture are never written back to the wrapped store.
pub struct FallbackStore<S> {
    primary: S,
    fixture: FixtureStore,
}

impl<S> FallbackStore<S> {
    pub fn new(primary: S, fixture: FixtureStore) -> Self {
        Self { primary, fixture }
    }
}

impl<S> DocumentStore for FallbackStore<S>
where
    S: DocumentStore,
{
    fn load(&self, locator: &DocumentLocator) -> Result<StoredDocument, StoreError> {
        match self.primary.load(locator) {
            Err(StoreError::Unavailable(err)) => {
                warn!(
                    %locator,
                    error_msg = %err,
                    "store unavailable, running in debug mode with the local fixture"
                );
                self.fixture.load(locator)
            }
            result => result,
        }
    }

    fn save(
        &self,
        locator: &DocumentLocator,
        stored: &StoredDocument,
    ) -> Result<SaveOutcome, StoreError> {
        match stored.version {
            DocumentVersion::Fixture => self.fixture.save(locator, stored),
            DocumentVersion::ResourceVersion(_) => self.primary.save(locator, stored),
        }
    }
}
