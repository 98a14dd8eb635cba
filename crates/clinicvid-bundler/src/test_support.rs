//! Store doubles shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use clinicvid_storage::{MemoryStore, ObjectMetadata, ObjectStore, StorageError, StorageResult};

/// Memory store whose operations can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_lists: AtomicBool,
    fail_writes: AtomicBool,
    fail_write_prefix: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, key: &str) {
        self.inner
            .write_object(key, Vec::new(), "application/octet-stream", None)
            .await
            .unwrap();
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only writes whose key starts with `prefix`.
    pub fn fail_writes_under(&self, prefix: &str) {
        *self.fail_write_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    /// Number of successful writes made through this store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn list_objects(
        &self,
        prefix: &str,
        max_results: Option<usize>,
    ) -> StorageResult<Vec<String>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StorageError::list_failed("injected list failure"));
        }
        self.inner.list_objects(prefix, max_results).await
    }

    async fn read_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read_object(key).await
    }

    async fn write_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
        metadata: Option<&ObjectMetadata>,
    ) -> StorageResult<()> {
        let prefix_fails = self
            .fail_write_prefix
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix));
        if prefix_fails || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::upload_failed("injected write failure"));
        }
        self.inner
            .write_object(key, content, content_type, metadata)
            .await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
