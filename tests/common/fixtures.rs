use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use super::http::{call, session_id};

/// 站立姿态（BlazePose 33 点），手肘、膝盖接近伸直
pub fn standing_pose() -> Vec<[f64; 3]> {
    let mut points: Vec<[f64; 3]> = (0..33)
        .map(|i| [0.5, 0.05 + i as f64 * 0.02, 0.0])
        .collect();

    points[11] = [0.42, 0.30, 0.0];
    points[12] = [0.58, 0.30, 0.0];
    points[13] = [0.40, 0.42, 0.0];
    points[14] = [0.60, 0.42, 0.0];
    points[15] = [0.39, 0.54, 0.0];
    points[16] = [0.61, 0.54, 0.0];
    points[23] = [0.45, 0.60, 0.0];
    points[24] = [0.55, 0.60, 0.0];
    points[25] = [0.45, 0.75, 0.0];
    points[26] = [0.55, 0.75, 0.0];
    points[27] = [0.45, 0.90, 0.0];
    points[28] = [0.55, 0.90, 0.0];
    points
}

/// 在站立姿态基础上弯曲左肘
pub fn bent_left_elbow() -> Vec<[f64; 3]> {
    let mut points = standing_pose();
    points[15] = [0.52, 0.40, 0.0];
    points
}

pub fn frame_body(points: &[[f64; 3]]) -> Value {
    json!({ "landmarks": points })
}

pub fn reference_body(points: &[[f64; 3]]) -> Value {
    json!({ "scheme": "blazepose33", "landmarks": points })
}

/// 以站立姿态为内联参考创建会话，返回会话 id
pub async fn create_standing_session(app: &Router) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/sessions",
        Some(reference_body(&standing_pose())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    session_id(&body)
}

pub async fn post_frame(app: &Router, id: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, &format!("/api/sessions/{id}/frames"), Some(body)).await
}
