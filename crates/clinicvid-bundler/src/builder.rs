//! Bundle builder.
//!
//! A build is always a full recompute from the current listing:
//! list → group → serialize → one write. Nothing is merged with the previous
//! snapshot, so any later build converges to the current storage state no
//! matter how many trigger events were missed or duplicated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use clinicvid_models::{AssetKind, AssetPath, Bundle, Namespace, VideoEntry};
use clinicvid_storage::ObjectStore;
use tracing::{debug, info, warn};

use crate::error::BundlerResult;
use crate::metrics;

/// Content type of the snapshot object.
const SNAPSHOT_CONTENT_TYPE: &str = "application/json";

/// Outcome of grouping a listing.
#[derive(Debug, Clone)]
struct Scan {
    bundle: Bundle,
    matched: usize,
    skipped: usize,
}

/// Group a listing into a bundle.
///
/// Keys that do not match the asset grammar, or that belong to another
/// clinic/department, are skipped. Videos keep first-encounter order and
/// languages keep insertion order. When several keys fill the same
/// (video, language, kind) slot the last one in listing order wins.
pub fn assemble_bundle<I, K>(namespace: &Namespace, keys: I) -> Bundle
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    scan(namespace, keys).bundle
}

fn scan<I, K>(namespace: &Namespace, keys: I) -> Scan
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut bundle = Bundle::new(namespace.clinic(), namespace.department());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut matched = 0;
    let mut skipped = 0;

    for key in keys {
        let key = key.as_ref();
        let asset = match AssetPath::parse(key) {
            Some(asset)
                if asset.clinic == namespace.clinic()
                    && asset.department == namespace.department() =>
            {
                asset
            }
            _ => {
                debug!(key = %key, "Skipping object outside the asset grammar");
                skipped += 1;
                continue;
            }
        };

        let slot = *index.entry(asset.video_id.to_string()).or_insert_with(|| {
            bundle.videos.push(VideoEntry::new(asset.video_id));
            bundle.videos.len() - 1
        });

        let language = bundle.videos[slot].languages.entry(asset.lang);
        let replaced = match asset.kind {
            AssetKind::Video => !language.video_path.is_empty(),
            AssetKind::Subtitle => !language.subtitle_path.is_empty(),
        };
        if replaced {
            warn!(
                key = %key,
                video_id = %asset.video_id,
                language = %asset.lang,
                kind = %asset.kind,
                "Duplicate asset, last listed object wins"
            );
        }
        language.set(asset.kind, key);
        matched += 1;
    }

    Scan {
        bundle,
        matched,
        skipped,
    }
}

/// Rebuilds and stores bundle snapshots.
pub struct BundleBuilder<S: ObjectStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ObjectStore + ?Sized> Clone for BundleBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ObjectStore + ?Sized> BundleBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rebuild the bundle of `namespace` and overwrite its snapshot.
    ///
    /// Returns the snapshot key. Listing and write failures propagate; a
    /// failure before the final write leaves the previous snapshot untouched.
    pub async fn build_bundle(&self, namespace: &Namespace) -> BundlerResult<String> {
        let start = Instant::now();
        let result = self.rebuild(namespace).await;
        metrics::record_bundle_build(result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    async fn rebuild(&self, namespace: &Namespace) -> BundlerResult<String> {
        let keys = self
            .store
            .list_objects(&namespace.assets_prefix(), None)
            .await?;
        let listed = keys.len();

        let Scan {
            bundle,
            matched,
            skipped,
        } = scan(namespace, &keys);
        metrics::record_objects_skipped(skipped);

        let snapshot_key = namespace.snapshot_key();
        let bytes = bundle.to_snapshot_bytes()?;
        self.store
            .write_object(&snapshot_key, bytes, SNAPSHOT_CONTENT_TYPE, None)
            .await?;

        info!(
            clinic = %namespace.clinic(),
            department = %namespace.department(),
            listed,
            matched,
            skipped,
            videos = bundle.videos.len(),
            snapshot = %snapshot_key,
            "Bundle rebuilt"
        );

        Ok(snapshot_key)
    }

    /// Read the stored snapshot of `namespace`.
    pub async fn load_bundle(&self, namespace: &Namespace) -> BundlerResult<Bundle> {
        let bytes = self.store.read_object(&namespace.snapshot_key()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
