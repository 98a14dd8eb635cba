//! Storage notification adapters.
//!
//! Notifications have no retry or compensation contract, so every failure
//! here is logged and swallowed. Correctness comes from the builder being a
//! full recompute: the next notification for the namespace repairs whatever
//! this one missed.

use std::sync::Arc;

use clinicvid_models::{Namespace, NotificationPath};
use clinicvid_storage::ObjectStore;
use tracing::{debug, error, info};

use crate::builder::BundleBuilder;
use crate::config::BundlerConfig;
use crate::folders::LanguageFolderInitializer;
use crate::metrics;

/// What a notification ended up doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Namespace the key resolved to, `None` when the key was ignored
    pub namespace: Option<Namespace>,
    /// Snapshot key when the rebuild succeeded
    pub snapshot_key: Option<String>,
    /// Video whose language folders were ensured successfully
    pub folders_ensured_for: Option<String>,
    /// Number of swallowed failures
    pub failures: usize,
}

impl EventOutcome {
    pub fn is_ignored(&self) -> bool {
        self.namespace.is_none()
    }

    fn outcome_label(&self) -> &'static str {
        if self.is_ignored() {
            "ignored"
        } else if self.failures > 0 {
            "failure"
        } else {
            "success"
        }
    }
}

/// Routes object created/deleted notifications to the builder and initializer.
pub struct EventDispatcher<S: ObjectStore + ?Sized> {
    builder: BundleBuilder<S>,
    folders: LanguageFolderInitializer<S>,
    languages: Arc<Vec<String>>,
}

impl<S: ObjectStore + ?Sized> Clone for EventDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            folders: self.folders.clone(),
            languages: Arc::clone(&self.languages),
        }
    }
}

impl<S: ObjectStore + ?Sized> EventDispatcher<S> {
    pub fn new(store: Arc<S>, config: BundlerConfig) -> Self {
        Self {
            builder: BundleBuilder::new(Arc::clone(&store)),
            folders: LanguageFolderInitializer::new(store),
            languages: Arc::new(config.languages),
        }
    }

    pub fn builder(&self) -> &BundleBuilder<S> {
        &self.builder
    }

    /// Handle an upload: rebuild the namespace bundle and, when the key sits
    /// inside a video folder, provision that video's language folders.
    ///
    /// The two steps are independent; one failing does not stop the other.
    pub async fn on_object_created(&self, key: &str) -> EventOutcome {
        let Some((namespace, video_name)) = resolve(key) else {
            metrics::record_event("created", "ignored");
            return EventOutcome::default();
        };

        let rebuild = self.rebuild(&namespace, key);
        let provision = async {
            match &video_name {
                Some(video_name) => Some(self.provision(&namespace, video_name, key).await),
                None => None,
            }
        };
        let (snapshot_key, provisioned) = tokio::join!(rebuild, provision);

        let mut outcome = EventOutcome {
            failures: usize::from(snapshot_key.is_none()),
            snapshot_key,
            ..Default::default()
        };
        match provisioned {
            Some(true) => outcome.folders_ensured_for = video_name,
            Some(false) => outcome.failures += 1,
            None => {}
        }
        outcome.namespace = Some(namespace);

        metrics::record_event("created", outcome.outcome_label());
        outcome
    }

    /// Handle a deletion: rebuild only. Folders are never removed.
    pub async fn on_object_deleted(&self, key: &str) -> EventOutcome {
        let Some((namespace, _)) = resolve(key) else {
            metrics::record_event("deleted", "ignored");
            return EventOutcome::default();
        };

        let snapshot_key = self.rebuild(&namespace, key).await;
        let outcome = EventOutcome {
            failures: usize::from(snapshot_key.is_none()),
            snapshot_key,
            namespace: Some(namespace),
            ..Default::default()
        };

        metrics::record_event("deleted", outcome.outcome_label());
        outcome
    }

    async fn rebuild(&self, namespace: &Namespace, key: &str) -> Option<String> {
        match self.builder.build_bundle(namespace).await {
            Ok(snapshot_key) => Some(snapshot_key),
            Err(e) => {
                error!(
                    clinic = %namespace.clinic(),
                    department = %namespace.department(),
                    key = %key,
                    error = %e,
                    "Bundle rebuild failed"
                );
                None
            }
        }
    }

    async fn provision(&self, namespace: &Namespace, video_name: &str, key: &str) -> bool {
        match self
            .folders
            .ensure_language_folders(namespace, video_name, &self.languages)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(
                    clinic = %namespace.clinic(),
                    department = %namespace.department(),
                    video_name = %video_name,
                    key = %key,
                    error = %e,
                    "Language folder initialization failed"
                );
                false
            }
        }
    }
}

/// Resolve a notification key to its namespace and optional video folder.
fn resolve(key: &str) -> Option<(Namespace, Option<String>)> {
    let Some(path) = NotificationPath::parse(key) else {
        debug!(key = %key, "Ignoring notification outside the videos tree");
        return None;
    };

    match Namespace::new(path.clinic, path.department) {
        Ok(namespace) => {
            info!(namespace = %namespace, key = %key, "Handling storage notification");
            Some((namespace, path.video_name.map(str::to_string)))
        }
        Err(e) => {
            debug!(key = %key, error = %e, "Ignoring notification with invalid namespace");
            None
        }
    }
}
