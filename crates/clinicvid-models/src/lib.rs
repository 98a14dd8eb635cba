//! Shared data models for clinic video bundles.
//!
//! This crate provides:
//! - Namespace (clinic/department) validation and key layout
//! - The asset path grammar used to recognise videos and subtitles
//! - Serde-serializable bundle snapshot types
//! - The default language list for folder provisioning

pub mod asset_path;
pub mod bundle;
pub mod language;
pub mod namespace;

pub use asset_path::{AssetKind, AssetPath, NotificationPath};
pub use bundle::{Bundle, LanguageAsset, LanguageMap, VideoEntry, BUNDLE_VERSION};
pub use language::{default_languages, DEFAULT_LANGUAGES};
pub use namespace::{
    Namespace, NamespaceError, BUNDLES_ROOT, PLACEHOLDER_NAME, SNAPSHOT_FILE_NAME, VIDEOS_ROOT,
};
