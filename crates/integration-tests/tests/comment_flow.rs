//! Product comments through the router.

use axum::http::StatusCode;
use minimart_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_comments_listed_newest_first() {
    let app = TestApp::new();
    let admin = app.register_admin("root").await;
    let customer = app.register("shopper").await;
    let id = app.create_product(&admin, "1.00", 1).await;

    for content in ["first", "second"] {
        let response = app
            .post(
                "/comment",
                Some(&customer),
                json!({ "productID": id, "content": content }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        assert_eq!(response.data()["content"], json!(content));
        assert_eq!(response.data()["product_id"], json!(id));
    }

    let listed = app.get(&format!("/comment/{id}"), Some(&customer)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let contents: Vec<_> = listed
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(contents, vec!["second", "first"]);
}

#[tokio::test]
async fn test_comment_content_is_trimmed_and_validated() {
    let app = TestApp::new();
    let admin = app.register_admin("root").await;
    let customer = app.register("shopper").await;
    let id = app.create_product(&admin, "1.00", 1).await;

    let trimmed = app
        .post(
            "/comment",
            Some(&customer),
            json!({ "productID": id, "content": "  sturdy  " }),
        )
        .await;
    assert_eq!(trimmed.data()["content"], json!("sturdy"));

    let blank = app
        .post(
            "/comment",
            Some(&customer),
            json!({ "productID": id, "content": "   " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let long = app
        .post(
            "/comment",
            Some(&customer),
            json!({ "productID": id, "content": "x".repeat(2001) }),
        )
        .await;
    assert_eq!(long.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_on_missing_product() {
    let app = TestApp::new();
    let customer = app.register("shopper").await;

    let response = app
        .post(
            "/comment",
            Some(&customer),
            json!({ "productID": 42, "content": "hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_require_a_session() {
    let app = TestApp::new();
    let admin = app.register_admin("root").await;
    let id = app.create_product(&admin, "1.00", 1).await;

    assert_eq!(
        app.get(&format!("/comment/{id}"), None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.post("/comment", None, json!({ "productID": id, "content": "hi" }))
            .await
            .status,
        StatusCode::UNAUTHORIZED
    );
}
