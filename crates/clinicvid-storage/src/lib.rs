//! Object storage for clinic video bundles.
//!
//! This crate provides:
//! - The `ObjectStore` capability interface (list, exists, read, write)
//! - An S3-compatible client with paginated listing
//! - An in-memory store for local runs and tests

pub mod client;
pub mod error;
pub mod memory;
pub mod store;

pub use client::{S3Store, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryStore, StoredObject};
pub use store::{ObjectMetadata, ObjectStore};
