use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::payload::{into_landmark_set, present, LandmarkInput, PosePayload};
use crate::response::{created, ok, AppError};
use crate::routes::realtime;
use crate::state::AppState;
use crate::validation::validate_reference_name;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:id", get(get_session).delete(delete_session))
        .route("/:id/frames", post(post_frame))
        .route("/:id/events", get(realtime::session_events))
}

/// 创建会话
///
/// - `{ "reference": "name" }`：使用已登记的参考姿态
/// - `{ "scheme", "landmarks" }`：内联参考姿态，`landmarks: null` 表示参考图像无姿态；
///   只要出现 `landmarks` 键（包括 `null`）即视为内联
/// - `{}`：使用 `DEFAULT_REFERENCE_NAME` 对应的参考姿态
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    reference: Option<String>,
    scheme: Option<pose_similarity::LandmarkScheme>,
    #[serde(default, deserialize_with = "present")]
    landmarks: Option<Option<Vec<LandmarkInput>>>,
}

async fn create_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let inline = req.scheme.is_some() || req.landmarks.is_some();
    let reference_name = match req.reference {
        Some(name) => Some(name),
        None if !inline => Some(state.config().reference.default_name.clone()),
        None => None,
    };

    let snapshot = match reference_name {
        Some(name) => {
            validate_reference_name(&name)
                .map_err(|msg| AppError::bad_request("INVALID_REFERENCE_NAME", msg))?;
            let stored = state
                .store()
                .get_reference(&name)?
                .ok_or_else(|| AppError::not_found("Reference pose not found"))?;
            state
                .sessions()
                .create(Some(stored.name), stored.scheme, stored.pose)
                .await?
        }
        None => {
            let scheme = req
                .scheme
                .unwrap_or(state.config().comparison.default_scheme);
            let pose = into_landmark_set(scheme, req.landmarks.flatten())?;
            state.sessions().create(None, scheme, pose).await?
        }
    };

    Ok(created(snapshot))
}

async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.sessions().list().await)
}

async fn get_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.sessions().snapshot(&id).await?))
}

async fn delete_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions().remove(&id).await {
        return Err(AppError::not_found("Session not found"));
    }
    Ok(ok(serde_json::json!({"deleted": true, "id": id})))
}

async fn post_frame(
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PosePayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .sessions()
        .compare_input(&id, payload.scheme, payload.landmarks)
        .await?;
    Ok(ok(outcome))
}
