use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use pose_similarity::LandmarkScheme;
use serde::Serialize;

use crate::extractors::JsonBody;
use crate::payload::PosePayload;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::reference_poses::StoredReference;
use crate::validation::validate_reference_name;

/// 列表视图，不含关键点坐标
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSummary {
    name: String,
    scheme: LandmarkScheme,
    detected: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&StoredReference> for ReferenceSummary {
    fn from(r: &StoredReference) -> Self {
        Self {
            name: r.name.clone(),
            scheme: r.scheme,
            detected: r.is_detected(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_references)).route(
        "/:name",
        get(get_reference)
            .put(put_reference)
            .delete(delete_reference),
    )
}

fn checked_name(name: &str) -> Result<(), AppError> {
    validate_reference_name(name).map_err(|msg| AppError::bad_request("INVALID_REFERENCE_NAME", msg))
}

async fn list_references(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let references = state.store().list_references()?;
    let summaries: Vec<ReferenceSummary> = references.iter().map(ReferenceSummary::from).collect();
    Ok(ok(summaries))
}

async fn get_reference(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    checked_name(&name)?;
    let reference = state
        .store()
        .get_reference(&name)?
        .ok_or_else(|| AppError::not_found("Reference pose not found"))?;
    Ok(ok(reference))
}

async fn put_reference(
    Path(name): Path<String>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PosePayload>,
) -> Result<axum::response::Response, AppError> {
    checked_name(&name)?;
    let scheme = payload.scheme_or(state.config().comparison.default_scheme);
    let pose = payload.into_pose(scheme)?;

    let existed = state.store().get_reference(&name)?.is_some();
    let stored = state.store().upsert_reference(&name, scheme, pose)?;
    tracing::info!(
        name = %stored.name,
        scheme = %stored.scheme,
        detected = stored.is_detected(),
        replaced = existed,
        "Reference pose stored"
    );

    let summary = ReferenceSummary::from(&stored);
    if existed {
        Ok(ok(summary).into_response())
    } else {
        Ok(created(summary).into_response())
    }
}

async fn delete_reference(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    checked_name(&name)?;
    if !state.store().delete_reference(&name)? {
        return Err(AppError::not_found("Reference pose not found"));
    }
    tracing::info!(name = %name, "Reference pose deleted");
    Ok(ok(serde_json::json!({"deleted": true, "name": name})))
}
