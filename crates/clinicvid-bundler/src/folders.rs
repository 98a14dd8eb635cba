//! Language folder initializer.
//!
//! Object storage has no real folders, so a language folder with no assets is
//! invisible. For each configured language that has nothing under
//! `videos/<clinic>/<department>/<video>/<lang>/` a zero-byte `.placeholder`
//! object is written. Languages that already hold any object are untouched.

use std::sync::Arc;

use chrono::Utc;
use clinicvid_models::Namespace;
use clinicvid_storage::{ObjectMetadata, ObjectStore};
use tracing::{debug, info, warn};

use crate::error::BundlerResult;
use crate::metrics;

const PLACEHOLDER_CONTENT_TYPE: &str = "application/x-empty";
const PLACEHOLDER_PURPOSE: &str = "language-folder-placeholder";

/// Creates placeholder objects for missing language folders.
pub struct LanguageFolderInitializer<S: ObjectStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ObjectStore + ?Sized> Clone for LanguageFolderInitializer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ObjectStore + ?Sized> LanguageFolderInitializer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Ensure every language in `languages` has a visible folder for `video_name`.
    ///
    /// A blank video name, or one containing `/`, is a logged no-op. The first
    /// storage failure aborts the loop and is returned; markers written before
    /// it stay in place.
    pub async fn ensure_language_folders(
        &self,
        namespace: &Namespace,
        video_name: &str,
        languages: &[String],
    ) -> BundlerResult<()> {
        let video_name = video_name.trim();
        if video_name.is_empty() {
            warn!(
                clinic = %namespace.clinic(),
                department = %namespace.department(),
                "Empty video name, skipping language folder initialization"
            );
            return Ok(());
        }
        if video_name.contains('/') {
            warn!(
                clinic = %namespace.clinic(),
                department = %namespace.department(),
                video_name = %video_name,
                "Video name contains '/', skipping language folder initialization"
            );
            return Ok(());
        }

        let mut created = 0usize;
        for lang in languages {
            let prefix = namespace.language_prefix(video_name, lang);
            if self.store.exists_with_prefix(&prefix).await? {
                debug!(prefix = %prefix, "Language folder already populated");
                continue;
            }

            let key = namespace.placeholder_key(video_name, lang);
            let metadata = placeholder_metadata(video_name, lang);
            self.store
                .write_object(&key, Vec::new(), PLACEHOLDER_CONTENT_TYPE, Some(&metadata))
                .await?;
            metrics::record_placeholder_created();
            created += 1;

            debug!(key = %key, "Created language folder placeholder");
        }

        info!(
            clinic = %namespace.clinic(),
            department = %namespace.department(),
            video_name = %video_name,
            created,
            languages = languages.len(),
            "Language folders ensured"
        );

        Ok(())
    }
}

fn placeholder_metadata(video_name: &str, lang: &str) -> ObjectMetadata {
    ObjectMetadata::from([
        ("purpose".to_string(), PLACEHOLDER_PURPOSE.to_string()),
        ("video-name".to_string(), video_name.to_string()),
        ("language".to_string(), lang.to_string()),
        ("created-at".to_string(), Utc::now().to_rfc3339()),
    ])
}
