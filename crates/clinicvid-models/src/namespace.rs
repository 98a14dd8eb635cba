//! Clinic/department namespace and the storage key layout derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root folder holding every uploaded asset.
pub const VIDEOS_ROOT: &str = "videos";

/// Root folder holding the derived bundle snapshots.
pub const BUNDLES_ROOT: &str = "bundles";

/// File name of the per-namespace snapshot.
pub const SNAPSHOT_FILE_NAME: &str = "bundle.json";

/// Marker object name used to make an empty language folder visible.
pub const PLACEHOLDER_NAME: &str = ".placeholder";

/// Errors raised when a namespace component is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must not contain '/': {value}")]
    InvalidSegment { field: &'static str, value: String },
}

/// A (clinic, department) pair scoping all storage paths and the derived bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    clinic: String,
    department: String,
}

impl Namespace {
    /// Create a namespace, rejecting blank components and components containing `/`.
    ///
    /// Components are trimmed before validation.
    pub fn new(clinic: impl AsRef<str>, department: impl AsRef<str>) -> Result<Self, NamespaceError> {
        Ok(Self {
            clinic: validate_segment("clinic", clinic.as_ref())?,
            department: validate_segment("department", department.as_ref())?,
        })
    }

    pub fn clinic(&self) -> &str {
        &self.clinic
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    /// Prefix under which every asset of this namespace lives: `videos/<clinic>/<department>/`.
    pub fn assets_prefix(&self) -> String {
        format!("{}/{}/{}/", VIDEOS_ROOT, self.clinic, self.department)
    }

    /// Prefix of one language folder of one video.
    pub fn language_prefix(&self, video_name: &str, lang: &str) -> String {
        format!("{}{}/{}/", self.assets_prefix(), video_name, lang)
    }

    /// Key of the marker object for a language folder.
    pub fn placeholder_key(&self, video_name: &str, lang: &str) -> String {
        format!("{}{}", self.language_prefix(video_name, lang), PLACEHOLDER_NAME)
    }

    /// Key of the bundle snapshot: `bundles/<clinic>/<department>/bundle.json`.
    pub fn snapshot_key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            BUNDLES_ROOT, self.clinic, self.department, SNAPSHOT_FILE_NAME
        )
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.clinic, self.department)
    }
}

fn validate_segment(field: &'static str, value: &str) -> Result<String, NamespaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NamespaceError::Missing(field));
    }
    if trimmed.contains('/') {
        return Err(NamespaceError::InvalidSegment {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
