//! Storage notification webhooks.
//!
//! Each key is dispatched to its own task and the webhook answers 202 right
//! away. Dispatch failures are logged by the dispatcher and never reach the
//! caller.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics;
use crate::state::AppState;

/// Notification body: a bare object name or an S3 event notification.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Object {
        name: String,
    },
    S3 {
        #[serde(rename = "Records")]
        records: Vec<S3EventRecord>,
    },
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub object: S3ObjectRef,
}

#[derive(Debug, Deserialize)]
pub struct S3ObjectRef {
    pub key: String,
}

impl NotificationPayload {
    /// Object keys carried by the notification, decoded.
    pub fn keys(self) -> Vec<String> {
        match self {
            Self::Object { name } => vec![name],
            Self::S3 { records } => records
                .into_iter()
                .filter_map(|r| decode_s3_key(&r.s3.object.key))
                .collect(),
        }
    }
}

/// S3 notifications URL-encode keys and use `+` for spaces.
fn decode_s3_key(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(key) => Some(key.into_owned()),
        Err(e) => {
            warn!(key = %raw, error = %e, "Dropping undecodable notification key");
            None
        }
    }
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct NotificationAccepted {
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy)]
enum NotificationKind {
    Created,
    Deleted,
}

impl NotificationKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
        }
    }
}

/// Object created (upload) notification.
pub async fn object_created(
    State(state): State<AppState>,
    Json(payload): Json<NotificationPayload>,
) -> (StatusCode, Json<NotificationAccepted>) {
    dispatch(state, NotificationKind::Created, payload.keys())
}

/// Object deleted notification.
pub async fn object_deleted(
    State(state): State<AppState>,
    Json(payload): Json<NotificationPayload>,
) -> (StatusCode, Json<NotificationAccepted>) {
    dispatch(state, NotificationKind::Deleted, payload.keys())
}

fn dispatch(
    state: AppState,
    kind: NotificationKind,
    keys: Vec<String>,
) -> (StatusCode, Json<NotificationAccepted>) {
    metrics::record_notifications(kind.as_str(), keys.len());
    let accepted = keys.len();

    for key in keys {
        debug!(key = %key, kind = kind.as_str(), "Dispatching storage notification");
        let dispatcher = state.dispatcher.clone();
        tokio::spawn(async move {
            match kind {
                NotificationKind::Created => dispatcher.on_object_created(&key).await,
                NotificationKind::Deleted => dispatcher.on_object_deleted(&key).await,
            };
        });
    }

    (StatusCode::ACCEPTED, Json(NotificationAccepted { accepted }))
}
