mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_server;
use common::http::{assert_error, call, read_json, send_traced};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_server().await;

    let (live_status, _) = call(&app.app, Method::GET, "/health/live", None).await;
    assert_eq!(live_status, StatusCode::OK);

    let (ready_status, _) = call(&app.app, Method::GET, "/health/ready", None).await;
    assert_eq!(ready_status, StatusCode::OK);
}

#[tokio::test]
async fn it_health_reports_sessions_and_store() {
    let app = spawn_test_server().await;

    let (status, body) = call(&app.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeSessions"], 0);
    assert_eq!(body["store"]["healthy"], true);

    let (status, body) = call(&app.app, Method::GET, "/health/store", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["references"], 0);
}

#[tokio::test]
async fn it_unknown_route_returns_json_404_with_trace_id() {
    let app = spawn_test_server().await;

    let resp = send_traced(&app.app, Method::GET, "/api/nothing-here", "trace-404").await;
    let (status, headers, body) = read_json(resp).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
    assert_eq!(body["traceId"], "trace-404");
    assert_eq!(headers["x-request-id"], "trace-404");
}
