//! Bundler error types.

use thiserror::Error;

pub type BundlerResult<T> = Result<T, BundlerError>;

#[derive(Debug, Error)]
pub enum BundlerError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] clinicvid_storage::StorageError),
}
