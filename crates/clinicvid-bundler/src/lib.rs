//! Bundle construction and language folder provisioning.
//!
//! This crate provides:
//! - `BundleBuilder`: full recompute of a namespace's bundle snapshot
//! - `LanguageFolderInitializer`: placeholder objects for missing languages
//! - `EventDispatcher`: upload/delete notification adapters that log and swallow failures
//! - Bundler configuration and metrics

pub mod builder;
pub mod config;
pub mod error;
pub mod events;
pub mod folders;
pub mod metrics;

pub use builder::{assemble_bundle, BundleBuilder};
pub use config::BundlerConfig;
pub use error::{BundlerError, BundlerResult};
pub use events::{EventDispatcher, EventOutcome};
pub use folders::LanguageFolderInitializer;

#[cfg(test)]
mod test_support;
