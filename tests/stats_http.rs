mod common;

use axum::http::Method;
use chrono::{Duration, Utc};

use common::app::spawn_test_server;
use common::http::{assert_status_ok_json, request, response_json};

async fn submit(app: &axum::Router, kid: &str, mission_id: u32, transcript: &str) {
    let response = request(
        app,
        Method::POST,
        "/api/v1/attempts",
        Some(serde_json::json!({
            "kidName": kid,
            "missionId": mission_id,
            "transcript": transcript,
        })),
    )
    .await;
    assert!(response.status().is_success());
}

#[tokio::test]
async fn it_stats_summarize_todays_practice() {
    let app = spawn_test_server().await;

    // Two successes and one miss, all today
    submit(&app.app, "nia", 1, "sun").await;
    submit(&app.app, "nia", 2, "cake").await;
    submit(&app.app, "nia", 6, "banana").await;

    let response = request(&app.app, Method::GET, "/api/v1/stats/nia", None).await;

    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["successes"], 2);
    assert_eq!(body["data"]["nearMisses"], 0);
    // 2/3, rounded to a whole percent
    assert_eq!(body["data"]["successRate"], 67);
    assert_eq!(body["data"]["totalStars"], 6);
    assert_eq!(body["data"]["bestStreak"], 2);

    assert_eq!(body["data"]["soundBreakdown"]["S"]["total"], 1);
    assert_eq!(body["data"]["soundBreakdown"]["S"]["success"], 1);
    assert_eq!(body["data"]["soundBreakdown"]["P"]["total"], 1);
    assert_eq!(body["data"]["soundBreakdown"]["P"]["success"], 0);

    let sessions = body["data"]["recentSessions"]
        .as_array()
        .expect("recentSessions");
    assert_eq!(sessions.len(), 3);
}

#[tokio::test]
async fn it_daily_activity_spans_a_week_with_today_counted_live() {
    let app = spawn_test_server().await;

    submit(&app.app, "remy", 1, "sun").await;
    submit(&app.app, "remy", 2, "cake").await;

    // A prior day comes from the rollup tree
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    app.state
        .store()
        .set_daily_activity("remy", yesterday, 4)
        .unwrap();

    let response = request(&app.app, Method::GET, "/api/v1/stats/remy", None).await;

    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);

    let days = body["data"]["dailyActivity"].as_array().expect("dailyActivity");
    assert_eq!(days.len(), 7);
    assert_eq!(days[5]["date"], yesterday.format("%Y-%m-%d").to_string());
    assert_eq!(days[5]["count"], 4);
    assert_eq!(
        days[6]["date"],
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );
    assert_eq!(days[6]["count"], 2);
}

#[tokio::test]
async fn it_stats_for_an_unknown_kid_are_all_zero() {
    let app = spawn_test_server().await;

    let response = request(&app.app, Method::GET, "/api/v1/stats/ghost", None).await;

    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["successRate"], 0);
    assert!(body["data"]["recentSessions"].as_array().expect("recentSessions").is_empty());
}
