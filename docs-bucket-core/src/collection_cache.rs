//! Memoised collection id → display name lookup.
//!
//! The lock only guards the map and is never held across the network call.
//! Two concurrent first-time lookups of the same id can therefore both reach
//! the source; both store the same name, and later lookups hit the cache.
//! Entries are never invalidated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::Result;
use crate::source::SourceApi;

pub struct CollectionNameCache<S> {
    source: Arc<S>,
    names: Mutex<HashMap<String, String>>,
}

impl<S: SourceApi> CollectionNameCache<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            names: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached name or fetches it through `collections.info`.
    /// A failed lookup leaves no entry behind, so the next call retries.
    pub async fn resolve(&self, collection_id: &str) -> Result<String> {
        if let Some(name) = self.cached(collection_id) {
            return Ok(name);
        }

        let collection = self.source.collection_info(collection_id).await?;
        debug!(collection_id, name = %collection.name, "Resolved collection name");

        self.lock()
            .insert(collection_id.to_string(), collection.name.clone());
        Ok(collection.name)
    }

    pub fn cached(&self, collection_id: &str) -> Option<String> {
        self.lock().get(collection_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // The map stays consistent even if a holder panicked mid-insert.
        self.names.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
