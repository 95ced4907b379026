use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use pose_coach::middleware::request_id::REQUEST_ID_HEADER;

async fn dispatch(app: &Router, method: Method, path: &str, body: Option<Value>, request_id: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(id) = request_id {
        builder = builder.header(REQUEST_ID_HEADER, id);
    }

    let req = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request body"),
        None => builder.body(Body::empty()).expect("empty body"),
    };

    app.clone().oneshot(req).await.expect("oneshot response")
}

/// 发送请求，保留原始响应（SSE 等需要读取流式正文）
pub async fn send(app: &Router, method: Method, path: &str, body: Option<Value>) -> Response {
    dispatch(app, method, path, body, None).await
}

/// 携带客户端指定的 `x-request-id`
pub async fn send_traced(app: &Router, method: Method, path: &str, request_id: &str) -> Response {
    dispatch(app, method, path, None, Some(request_id)).await
}

pub async fn read_json(resp: Response) -> (StatusCode, HeaderMap, Value) {
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body bytes");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes).expect("parse json body")
    };

    (status, headers, json)
}

/// 发送 JSON 请求并解析响应
pub async fn call(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, json) = read_json(send(app, method, path, body).await).await;
    (status, json)
}

/// 成功信封 `{success: true, data}`，返回 `data`
pub fn data(status: StatusCode, body: &Value) -> &Value {
    assert!(status.is_success(), "unexpected status {status}: {body}");
    assert_eq!(body["success"], true);
    &body["data"]
}

/// 错误信封：错误码、非空消息，以及由中间件注入的 `traceId`
pub fn assert_error(status: StatusCode, body: &Value, expected_status: StatusCode, code: &str) {
    assert_eq!(status, expected_status, "body: {body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], code);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(body["traceId"].as_str().is_some_and(|t| !t.is_empty()));
}

/// 会话 id（来自 `POST /api/sessions` 的响应）
pub fn session_id(body: &Value) -> String {
    body["data"]["id"].as_str().expect("session id").to_string()
}
