use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use super::{assign_id, matches_all, Collection, DocumentStore, Patch, Predicate, StoreError};

/// In-process document store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn create(&self, collection: Collection, mut document: Value) -> Result<String, StoreError> {
        let id = assign_id(&mut document)?;
        let mut guard = self.collections.write().await;
        guard.entry(collection).or_default().insert(id.clone(), document);
        debug!(%collection, %id, "document created");
        Ok(id)
    }

    async fn patch(&self, collection: Collection, id: &str, patch: &Patch) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let document = guard
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        // Apply to a copy so a failed patch leaves the stored document untouched
        let mut updated = document.clone();
        patch.apply_to(&mut updated)?;
        *document = updated;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        guard
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<Vec<Value>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches_all(doc, predicates))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
