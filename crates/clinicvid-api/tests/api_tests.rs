//! API integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use clinicvid_api::state::SharedStore;
use clinicvid_api::{create_router, ApiConfig, AppState};
use clinicvid_bundler::BundlerConfig;
use clinicvid_storage::{MemoryStore, ObjectMetadata, ObjectStore, StorageError, StorageResult};

/// Store whose every operation fails.
struct BrokenStore;

#[async_trait]
impl ObjectStore for BrokenStore {
    async fn list_objects(&self, _prefix: &str, _max: Option<usize>) -> StorageResult<Vec<String>> {
        Err(StorageError::list_failed("bucket unreachable"))
    }

    async fn read_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::DownloadFailed(format!("bucket unreachable: {}", key)))
    }

    async fn write_object(
        &self,
        _key: &str,
        _content: Vec<u8>,
        _content_type: &str,
        _metadata: Option<&ObjectMetadata>,
    ) -> StorageResult<()> {
        Err(StorageError::upload_failed("bucket unreachable"))
    }
}

fn bundler_config() -> BundlerConfig {
    BundlerConfig {
        languages: vec!["en".to_string(), "fr".to_string()],
    }
}

fn router_with(store: SharedStore) -> Router {
    let state = AppState::with_store(ApiConfig::default(), bundler_config(), store);
    create_router(state, None)
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Wait for spawned notification tasks to land.
async fn wait_for_key(store: &MemoryStore, key: &str) -> bool {
    for _ in 0..100 {
        if store.get(key).await.is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let response = app.oneshot(get("/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_ready_reports_storage_state() {
    let ok = router_with(Arc::new(MemoryStore::new()))
        .oneshot(get("/ready"))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let degraded = router_with(Arc::new(BrokenStore))
        .oneshot(get("/ready"))
        .await
        .unwrap();
    assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(degraded).await["status"], "degraded");
}

#[tokio::test]
async fn test_generate_bundle_writes_snapshot() {
    let store = Arc::new(
        MemoryStore::with_keys([
            "videos/c1/d1/v1/en/a.mp4",
            "videos/c1/d1/v1/en/a.vtt",
            "videos/c1/d1/v1/fr/b.mp4",
        ])
        .await,
    );
    let app = router_with(store.clone());

    let response = app
        .clone()
        .oneshot(json_post("/api/bundles", r#"{"clinic": "c1", "department": "d1"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["snapshotPath"], "bundles/c1/d1/bundle.json");

    let response = app.oneshot(get("/api/bundles/c1/d1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bundle = body_json(response).await;
    assert_eq!(bundle["version"], "1.0");
    assert_eq!(bundle["videos"][0]["id"], "v1");
    assert_eq!(
        bundle["videos"][0]["languages"]["fr"]["subtitlePath"],
        ""
    );
}

#[tokio::test]
async fn test_generate_bundle_accepts_query_params() {
    let store = Arc::new(MemoryStore::new());
    let app = router_with(store.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/bundles?clinic=c1&department=d1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.get("bundles/c1/d1/bundle.json").await.is_some());
}

#[tokio::test]
async fn test_generate_bundle_requires_identifiers() {
    let store = Arc::new(MemoryStore::new());
    let app = router_with(store.clone());

    let missing = app
        .clone()
        .oneshot(json_post("/api/bundles", r#"{"clinic": "c1"}"#))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let blank = app
        .oneshot(json_post("/api/bundles", r#"{"clinic": "c1", "department": "  "}"#))
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_generate_bundle_surfaces_storage_failure() {
    let app = router_with(Arc::new(BrokenStore));

    let response = app
        .oneshot(json_post("/api/bundles", r#"{"clinic": "c1", "department": "d1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_snapshot_is_not_found() {
    let app = router_with(Arc::new(MemoryStore::new()));

    let response = app.oneshot(get("/api/bundles/c1/d1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_notification_rebuilds_and_provisions() {
    let store = Arc::new(MemoryStore::with_keys(["videos/c1/d1/v1/en/a.mp4"]).await);
    let app = router_with(store.clone());

    let response = app
        .oneshot(json_post(
            "/events/object-created",
            r#"{"name": "videos/c1/d1/v1/en/a.mp4"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["accepted"], 1);

    assert!(wait_for_key(&store, "bundles/c1/d1/bundle.json").await);
    assert!(wait_for_key(&store, "videos/c1/d1/v1/fr/.placeholder").await);
    assert!(store.get("videos/c1/d1/v1/en/.placeholder").await.is_none());
}

#[tokio::test]
async fn test_delete_notification_from_s3_event() {
    let store = Arc::new(MemoryStore::with_keys(["videos/c1/d1/v1/en/a.mp4"]).await);
    let app = router_with(store.clone());

    let response = app
        .oneshot(json_post(
            "/events/object-deleted",
            r#"{"Records": [{"s3": {"object": {"key": "videos/c1/d1/v2/en/old.mp4"}}}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert!(wait_for_key(&store, "bundles/c1/d1/bundle.json").await);
    assert!(store.get("videos/c1/d1/v2/fr/.placeholder").await.is_none());
}

#[tokio::test]
async fn test_notification_failures_are_not_surfaced() {
    let app = router_with(Arc::new(BrokenStore));

    let response = app
        .oneshot(json_post(
            "/events/object-created",
            r#"{"name": "videos/c1/d1/v1/en/a.mp4"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
