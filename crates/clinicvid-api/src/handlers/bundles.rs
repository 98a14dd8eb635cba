//! Bundle handlers.
//!
//! Manual regeneration surfaces failures as server errors, unlike the
//! notification webhooks.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinicvid_models::Namespace;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Namespace identifiers, accepted from the query string or a JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct NamespaceParams {
    #[serde(default)]
    pub clinic: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl NamespaceParams {
    /// Body values win over query values.
    fn merge(self, other: NamespaceParams) -> NamespaceParams {
        NamespaceParams {
            clinic: other.clinic.or(self.clinic),
            department: other.department.or(self.department),
        }
    }

    fn into_namespace(self) -> ApiResult<Namespace> {
        match (self.clinic, self.department) {
            (Some(clinic), Some(department)) => Ok(Namespace::new(clinic, department)?),
            _ => Err(ApiError::bad_request("clinic and department are required")),
        }
    }
}

/// Regeneration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBundleResponse {
    pub clinic: String,
    pub department: String,
    pub snapshot_path: String,
}

/// Rebuild the bundle of a clinic/department.
pub async fn generate_bundle(
    State(state): State<AppState>,
    Query(query): Query<NamespaceParams>,
    body: Option<Json<NamespaceParams>>,
) -> ApiResult<Json<GenerateBundleResponse>> {
    let params = match body {
        Some(Json(body)) => query.merge(body),
        None => query,
    };
    let namespace = params.into_namespace()?;

    let snapshot_path = state
        .dispatcher
        .builder()
        .build_bundle(&namespace)
        .await
        .map_err(|e| {
            error!(namespace = %namespace, error = %e, "Manual bundle generation failed");
            e
        })?;

    info!(namespace = %namespace, snapshot = %snapshot_path, "Manual bundle generation complete");

    Ok(Json(GenerateBundleResponse {
        clinic: namespace.clinic().to_string(),
        department: namespace.department().to_string(),
        snapshot_path,
    }))
}

/// Return the stored snapshot of a clinic/department as-is.
pub async fn get_bundle(
    State(state): State<AppState>,
    Path((clinic, department)): Path<(String, String)>,
) -> ApiResult<Response> {
    let namespace = Namespace::new(clinic, department)?;
    let bytes = state
        .store
        .read_object(&namespace.snapshot_key())
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiError::not_found(format!("No bundle for {}", namespace))
            } else {
                ApiError::from(e)
            }
        })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}
