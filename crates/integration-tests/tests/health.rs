//! Liveness, readiness and request id propagation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use minimart_integration_tests::TestApp;
use minimart_server::middleware::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.text, "ok");

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::new();
    let response = app.get("/product", None).await;

    let id = response.headers.get(REQUEST_ID_HEADER).unwrap();
    assert_eq!(id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_request_id_is_echoed_on_errors() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/order")
        .header(REQUEST_ID_HEADER, "trace-me-42")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers.get(REQUEST_ID_HEADER).unwrap(),
        "trace-me-42"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/nope", None).await.status, StatusCode::NOT_FOUND);
}
