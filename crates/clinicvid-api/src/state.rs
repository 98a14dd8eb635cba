//! Application state.

use std::sync::Arc;

use clinicvid_bundler::{BundlerConfig, EventDispatcher};
use clinicvid_storage::{MemoryStore, ObjectStore, S3Store, StorageResult};
use tracing::warn;

use crate::config::{ApiConfig, StorageBackend};

/// Object store shared by every handler.
pub type SharedStore = Arc<dyn ObjectStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: SharedStore,
    pub dispatcher: EventDispatcher<dyn ObjectStore>,
}

impl AppState {
    /// Create application state, connecting to the configured backend.
    pub async fn new(config: ApiConfig, bundler: BundlerConfig) -> StorageResult<Self> {
        let store: SharedStore = match config.storage_backend {
            StorageBackend::S3 => Arc::new(S3Store::from_env().await?),
            StorageBackend::Memory => {
                warn!("Using in-memory object store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::with_store(config, bundler, store))
    }

    /// Create application state around an existing store.
    pub fn with_store(config: ApiConfig, bundler: BundlerConfig, store: SharedStore) -> Self {
        let dispatcher = EventDispatcher::new(Arc::clone(&store), bundler);
        Self {
            config,
            store,
            dispatcher,
        }
    }
}
