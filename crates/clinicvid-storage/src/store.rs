//! Storage capability interface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StorageResult;

/// User metadata attached to a written object.
pub type ObjectMetadata = HashMap<String, String>;

/// Minimal surface the bundler needs from a flat object namespace.
///
/// Keys are `/`-delimited logical paths. Listing order is whatever the
/// backend returns and is not guaranteed to be stable across calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List keys starting with `prefix`, following pagination until the
    /// listing is exhausted or `max_results` keys have been collected.
    async fn list_objects(&self, prefix: &str, max_results: Option<usize>)
        -> StorageResult<Vec<String>>;

    /// Read a whole object.
    async fn read_object(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write a whole object, replacing any existing content.
    async fn write_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
        metadata: Option<&ObjectMetadata>,
    ) -> StorageResult<()>;

    /// Whether at least one object exists under `prefix`.
    async fn exists_with_prefix(&self, prefix: &str) -> StorageResult<bool> {
        Ok(!self.list_objects(prefix, Some(1)).await?.is_empty())
    }
}
