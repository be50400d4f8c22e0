mod common;

use axum::http::{HeaderMap, Method, StatusCode};

use common::app::spawn_test_server_with_limits;
use common::http::{assert_json_error, request, response_json};

#[tokio::test]
async fn it_requests_over_the_limit_get_429_with_headers() {
    let app = spawn_test_server_with_limits(3).await;

    let mut last_status = StatusCode::OK;
    let mut last_headers = HeaderMap::new();
    let mut last_body = serde_json::json!({});

    for _ in 0..4 {
        let response = request(&app.app, Method::GET, "/api/v1/content/chapters", None).await;
        let (status, headers, body) = response_json(response).await;
        last_status = status;
        last_headers = headers;
        last_body = body;
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
    assert_json_error(&last_body, "RATE_LIMITED");
    assert!(last_headers.contains_key("retry-after"));
    assert_eq!(
        last_headers
            .get("ratelimit-limit")
            .and_then(|v| v.to_str().ok()),
        Some("3")
    );
    assert_eq!(
        last_headers
            .get("ratelimit-remaining")
            .and_then(|v| v.to_str().ok()),
        Some("0")
    );
    assert!(last_headers.contains_key("ratelimit-reset"));
}

#[tokio::test]
async fn it_responses_under_the_limit_carry_remaining_counts() {
    let app = spawn_test_server_with_limits(5).await;

    let response = request(&app.app, Method::GET, "/api/v1/content/chapters", None).await;
    let (status, headers, _) = response_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("ratelimit-limit").and_then(|v| v.to_str().ok()),
        Some("5")
    );
    assert_eq!(
        headers
            .get("ratelimit-remaining")
            .and_then(|v| v.to_str().ok()),
        Some("4")
    );
}

#[tokio::test]
async fn it_health_endpoints_are_exempt() {
    let app = spawn_test_server_with_limits(1).await;

    for _ in 0..5 {
        let response = request(&app.app, Method::GET, "/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
