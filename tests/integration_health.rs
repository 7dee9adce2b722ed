#![allow(clippy::unwrap_used, clippy::panic, clippy::todo, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use common::{QueueMode, RecordingQueue, TestApp};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_health_reports_identity() {
    let app = TestApp::spawn(RecordingQueue::new(QueueMode::Healthy)).await;

    let resp = app.health().await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "healthy", "service": "ComplaintService", "version": "0.1.0"}));
}

#[tokio::test]
async fn test_health_ignores_transport_state() {
    let queue = RecordingQueue::new(QueueMode::Unreachable);
    let mut config = common::get_test_config();
    config.app_name = "CustomComplaints".to_string();
    config.app_version = "2.3.4".to_string();
    let app = TestApp::spawn_with_config(config, Arc::<RecordingQueue>::clone(&queue)).await;

    let resp = app.health().await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "CustomComplaints");
    assert_eq!(body["version"], "2.3.4");
    assert_eq!(queue.attempts(), 0);
}
