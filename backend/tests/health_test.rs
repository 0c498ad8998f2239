//! Health endpoints against a live database

mod common;

use axum::http::{Method, StatusCode};

#[tokio::test]
#[ignore = "requires database"]
async fn test_process_checks_answer_without_database_section() {
    let app = common::TestApp::new().await;

    for (path, status) in [("/health", "healthy"), ("/health/live", "alive")] {
        let (code, body) = app.json(Method::GET, path, None, None).await;
        assert_eq!(code, StatusCode::OK, "{}", path);
        assert_eq!(body["status"], status);
        assert!(body.get("database").is_none());
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_sees_database() {
    let app = common::TestApp::new().await;

    let (code, body) = app.json(Method::GET, "/health/ready", None, None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"]["reachable"], true);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_api_root_names_service() {
    let app = common::TestApp::new().await;

    let (code, body) = app.get("/api/").await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, "Foodgram API");
}
