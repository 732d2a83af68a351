//! Integration tests for the timing session API
//!
//! Drives the router in-process with a manual clock so durations are exact.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use quickcheck_timing::{create_router, engine::ManualClock, AppState};

fn setup_test_server() -> (Router, Arc<AppState>, ManualClock) {
    let clock = ManualClock::at_epoch();
    let state = Arc::new(AppState::with_clock(
        20554,
        "127.0.0.1".to_string(),
        ["info", "pulling", "underhood", "tires"].map(String::from).to_vec(),
        Duration::from_secs(1),
        Arc::new(clock.clone()),
    ));
    (create_router(Arc::clone(&state)), state, clock)
}

async fn make_request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn open_session(app: &Router, body: Value) -> String {
    let (status, value) = make_request(app, Method::POST, "/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_status() {
    let (app, _state, _clock) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = make_request(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open_sessions"], 0);
    assert_eq!(body["default_tabs"], json!(["info", "pulling", "underhood", "tires"]));
}

#[tokio::test]
async fn test_inspection_flow() {
    let (app, state, clock) = setup_test_server();
    let id = open_session(&app, json!({})).await;
    let path = format!("/sessions/{}", id);

    let (status, body) =
        make_request(&app, Method::POST, &format!("{}/tab", path), Some(json!({"tab": "info"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["active_tab"], "info");

    clock.advance_secs(5);
    let (status, body) =
        make_request(&app, Method::POST, &format!("{}/tab", path), Some(json!({"tab": "pulling"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["change"]["previous_tab"], "info");
    assert_eq!(body["change"]["closed_seconds"], 5);

    clock.advance_secs(3);
    let (status, body) = make_request(&app, Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["timings"],
        json!({
            "info_duration": 5,
            "pulling_duration": 3,
            "underhood_duration": 0,
            "tires_duration": 0
        })
    );
    assert_eq!(body["total_seconds"], 8);

    let (status, body) = make_request(&app, Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timings"]["pulling_duration"], 3);
    assert_eq!(state.session_count(), 0);

    let (status, _) = make_request(&app, Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_draft_resume_by_index() {
    let (app, _state, clock) = setup_test_server();
    let id = open_session(
        &app,
        json!({
            "initial_timings": {"info_duration": 40, "tires_duration": 12},
            "current_tab_index": 3
        }),
    )
    .await;
    let path = format!("/sessions/{}", id);

    clock.advance_secs(8);
    let (status, body) =
        make_request(&app, Method::POST, &format!("{}/tab", path), Some(json!({"index": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["change"]["previous_tab"], "tires");
    assert_eq!(body["session"]["timings"]["tires_duration"], 20);
    assert_eq!(body["session"]["timings"]["info_duration"], 40);

    clock.advance_secs(65);
    let (status, body) = make_request(&app, Method::GET, &format!("{}/summary", path), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tabs"][0]["tab"], "info");
    assert_eq!(body["tabs"][0]["seconds"], 105);
    assert_eq!(body["tabs"][0]["formatted"], "1m 45s");
    assert_eq!(body["tabs"][0]["active"], true);
    assert_eq!(body["total_seconds"], 125);
    assert_eq!(body["total_formatted"], "2m 5s");
}

#[tokio::test]
async fn test_stop_freezes_timings() {
    let (app, _state, clock) = setup_test_server();
    let id = open_session(&app, json!({"current_tab_index": 2})).await;
    let path = format!("/sessions/{}", id);

    clock.advance_secs(7);
    let (status, body) = make_request(&app, Method::POST, &format!("{}/stop", path), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_tab"], Value::Null);
    assert_eq!(body["timings"]["underhood_duration"], 7);

    clock.advance_secs(30);
    let (_, again) = make_request(&app, Method::POST, &format!("{}/stop", path), None).await;
    assert_eq!(again["timings"], body["timings"]);
}

#[tokio::test]
async fn test_invalid_input_rejected() {
    let (app, _state, clock) = setup_test_server();
    let id = open_session(&app, json!({"tabs": ["a", "b"], "current_tab_index": 0})).await;
    let path = format!("/sessions/{}", id);
    clock.advance_secs(2);

    let (status, body) =
        make_request(&app, Method::POST, &format!("{}/tab", path), Some(json!({"tab": "nonexistent"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) =
        make_request(&app, Method::POST, &format!("{}/tab", path), Some(json!({"index": 2}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = make_request(&app, Method::GET, &path, None).await;
    assert_eq!(body["active_tab"], "a");
    assert_eq!(body["timings"], json!({"a_duration": 2, "b_duration": 0}));

    let (status, _) =
        make_request(&app, Method::POST, "/sessions", Some(json!({"tabs": ["a", "a"]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = make_request(
        &app,
        Method::GET,
        "/sessions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resending_current_index_keeps_time() {
    let (app, _state, clock) = setup_test_server();
    let id = open_session(&app, json!({"current_tab_index": 0})).await;
    let tab_path = format!("/sessions/{}/tab", id);

    for _ in 0..8 {
        clock.advance(chrono::Duration::milliseconds(500));
        let (status, body) =
            make_request(&app, Method::POST, &tab_path, Some(json!({"index": 0}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["change"], Value::Null);
        assert_eq!(body["session"]["active_tab"], "info");
    }

    let (_, body) = make_request(&app, Method::GET, &format!("/sessions/{}", id), None).await;
    assert_eq!(body["timings"]["info_duration"], 4);
}

#[tokio::test]
async fn test_huge_seed_totals_saturate() {
    let (app, _state, _clock) = setup_test_server();
    let id = open_session(
        &app,
        json!({"initial_timings": {"info_duration": u64::MAX, "pulling_duration": 1}}),
    )
    .await;

    let (status, body) = make_request(&app, Method::GET, &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seconds"], u64::MAX);

    let (status, body) =
        make_request(&app, Method::GET, &format!("/sessions/{}/summary", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seconds"], u64::MAX);
}
