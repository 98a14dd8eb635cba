//! Bundler metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const BUNDLE_BUILDS_TOTAL: &str = "clinicvid_bundle_builds_total";
    pub const BUNDLE_BUILD_DURATION_SECONDS: &str = "clinicvid_bundle_build_duration_seconds";
    pub const BUNDLE_OBJECTS_SKIPPED_TOTAL: &str = "clinicvid_bundle_objects_skipped_total";
    pub const PLACEHOLDERS_CREATED_TOTAL: &str = "clinicvid_placeholders_created_total";
    pub const EVENTS_TOTAL: &str = "clinicvid_events_total";
}

/// Record a finished bundle build.
pub fn record_bundle_build(success: bool, duration_secs: f64) {
    let labels = [("outcome", outcome_label(success).to_string())];
    counter!(names::BUNDLE_BUILDS_TOTAL, &labels).increment(1);
    histogram!(names::BUNDLE_BUILD_DURATION_SECONDS).record(duration_secs);
}

/// Record keys that did not match the asset grammar.
pub fn record_objects_skipped(count: usize) {
    if count > 0 {
        counter!(names::BUNDLE_OBJECTS_SKIPPED_TOTAL).increment(count as u64);
    }
}

/// Record a placeholder marker write.
pub fn record_placeholder_created() {
    counter!(names::PLACEHOLDERS_CREATED_TOTAL).increment(1);
}

/// Record a handled storage notification.
pub fn record_event(kind: &str, outcome: &str) {
    let labels = [("kind", kind.to_string()), ("outcome", outcome.to_string())];
    counter!(names::EVENTS_TOTAL, &labels).increment(1);
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
