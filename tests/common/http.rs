use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

/// oneshot 一个请求；body 为 Some 时自动带上 JSON content-type。
pub async fn request(app: &Router, method: Method, path: &str, body: Option<Value>) -> Response {
    let req = match body {
        Some(payload) => Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty()),
    }
    .expect("build request");

    app.clone().oneshot(req).await.expect("oneshot response")
}

pub async fn response_json(resp: Response) -> (StatusCode, HeaderMap, Value) {
    let (parts, body) = resp.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.expect("read body bytes");

    let json = if bytes.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&bytes).expect("parse json body")
    };

    (parts.status, parts.headers, json)
}

pub fn assert_json_error(body: &Value, code: &str) {
    assert_eq!(body["success"], false, "expected an error envelope: {body}");
    assert_eq!(body["code"], code, "unexpected error code: {body}");
    assert!(body.get("message").is_some(), "error body missing message");
}

pub fn assert_status_ok_json(status: StatusCode, body: &Value) {
    assert!(status.is_success(), "unexpected status {status}: {body}");
    assert_eq!(body["success"], true, "expected a success envelope: {body}");
    assert!(body.get("data").is_some(), "success body missing data");
}
