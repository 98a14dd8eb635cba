//! In-memory object store.
//!
//! Listing is lexicographic by key, matching what S3-compatible backends return.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectMetadata, ObjectStore};

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

/// Process-local object store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with empty objects at the given keys.
    pub async fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let store = Self::new();
        {
            let mut objects = store.objects.write().await;
            for key in keys {
                objects.insert(key.into(), StoredObject::default());
            }
        }
        store
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn remove(&self, key: &str) -> Option<StoredObject> {
        self.objects.write().await.remove(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        prefix: &str,
        max_results: Option<usize>,
    ) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        let matching = objects
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone());

        let keys: Vec<String> = match max_results {
            Some(max) => matching.take(max).collect(),
            None => matching.collect(),
        };
        debug!("Listed {} objects under {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn read_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content.clone())
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn write_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
        metadata: Option<&ObjectMetadata>,
    ) -> StorageResult<()> {
        let object = StoredObject {
            content,
            content_type: content_type.to_string(),
            metadata: metadata.cloned().unwrap_or_default(),
        };
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }
}
