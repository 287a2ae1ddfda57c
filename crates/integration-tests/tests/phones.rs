//! Phone catalog over HTTP: paging, detail, writes and token checks.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use bilemo_api::error::{EMPTY_PAGE, VALIDATION_FAILED};
use bilemo_api::middleware::auth::{INVALID_TOKEN, MISSING_TOKEN};
use bilemo_api::routes::MALFORMED_BODY;
use bilemo_api::updater::NOTHING_TO_UPDATE;
use bilemo_integration_tests::{ALICE_TOKEN, PHONE_COUNT, TestContext};
use serde_json::{Value, json};

fn first_phone_id(list: &Value) -> i64 {
    list[0]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_pages_of_ten_then_empty_page() {
    let ctx = TestContext::new().await;

    let (status, page1) = ctx.get("/api/phones?page=1", ALICE_TOKEN).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1.as_array().unwrap().len(), 10);

    let (_, page3) = ctx.get("/api/phones?page=3", ALICE_TOKEN).await;
    assert_eq!(page3.as_array().unwrap().len(), 5);

    let (status, body) = ctx.get("/api/phones?page=4", ALICE_TOKEN).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Error : {EMPTY_PAGE}"));
}

#[tokio::test]
async fn test_catalog_is_unpaged_without_page_param() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/phones", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), PHONE_COUNT);
}

#[tokio::test]
async fn test_malformed_page_means_first_page() {
    let ctx = TestContext::new().await;

    let (_, first) = ctx.get("/api/phones?page=1", ALICE_TOKEN).await;
    let (status, malformed) = ctx.get("/api/phones?page=abc", ALICE_TOKEN).await;
    let (_, negative) = ctx.get("/api/phones?page=-3", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(malformed, first);
    assert_eq!(negative, first);
}

#[tokio::test]
async fn test_repeated_page_uses_first_value() {
    let ctx = TestContext::new().await;

    let (_, first) = ctx.get("/api/phones?page=1", ALICE_TOKEN).await;
    let (status, repeated) = ctx.get("/api/phones?page=1&page=2", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(repeated, first);
}

#[tokio::test]
async fn test_phone_detail_has_self_link() {
    let ctx = TestContext::new().await;
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let id = first_phone_id(&list);

    let (status, phone) = ctx.get(&format!("/api/phones/{id}"), ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(phone["name"], "Phone 1");
    assert_eq!(phone["_links"]["self"]["href"], format!("/api/phones/{id}"));
}

#[tokio::test]
async fn test_unknown_or_non_numeric_phone_is_not_found() {
    let ctx = TestContext::new().await;

    for uri in ["/api/phones/99999", "/api/phones/abc", "/api/phones/%FF"] {
        let (status, body) = ctx.get(uri, ALICE_TOKEN).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["message"], "Error : Phone object not found");
    }
}

#[tokio::test]
async fn test_invalid_phone_is_rejected_with_details() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/phones",
            Some(ALICE_TOKEN),
            Some(&json!({ "name": "", "color": "Red", "price": 0, "description": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(body["error"], VALIDATION_FAILED);
    assert!(body["error_details"]["name"].is_array());
    assert!(body["error_details"]["price"].is_array());
    assert!(body["error_details"].get("color").is_none());

    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    assert_eq!(list.as_array().unwrap().len(), PHONE_COUNT);
}

#[tokio::test]
async fn test_created_phone_appears_in_catalog() {
    let ctx = TestContext::new().await;
    // Warm the catalog cache so the create has something to invalidate.
    ctx.get("/api/phones", ALICE_TOKEN).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/phones")
        .header(header::AUTHORIZATION, format!("Bearer {ALICE_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "Nova 3", "color": "Blue", "price": 799, "description": "New" })
                .to_string(),
        ))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Phone has been added to the database !");

    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), PHONE_COUNT + 1);
    assert!(list.iter().any(|p| p["name"] == "Nova 3"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/phones")
        .header(header::AUTHORIZATION, format!("Bearer {ALICE_TOKEN}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Error : {MALFORMED_BODY}"));
}

#[tokio::test]
async fn test_partial_update_changes_only_given_fields() {
    let ctx = TestContext::new().await;
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let id = first_phone_id(&list);
    let uri = format!("/api/phones/{id}");

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(ALICE_TOKEN), Some(&json!({ "price": 650 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Phone : {id} has been updated !"));

    let (_, phone) = ctx.get(&uri, ALICE_TOKEN).await;
    assert_eq!(phone["price"], 650);
    assert_eq!(phone["name"], "Phone 1");
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let uri = format!("/api/phones/{}", first_phone_id(&list));

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(ALICE_TOKEN), Some(&json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Error : {NOTHING_TO_UPDATE}"));
}

#[tokio::test]
async fn test_wrong_field_type_is_a_validation_error() {
    let ctx = TestContext::new().await;
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let uri = format!("/api/phones/{}", first_phone_id(&list));

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(ALICE_TOKEN), Some(&json!({ "price": "cheap" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error_details"]["price"].is_array());

    let (_, phone) = ctx.get(&uri, ALICE_TOKEN).await;
    assert_eq!(phone["price"], 500);
}

#[tokio::test]
async fn test_deleted_phone_is_gone() {
    let ctx = TestContext::new().await;
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    let uri = format!("/api/phones/{}", first_phone_id(&list));

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(ALICE_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Phone has been removed !");

    let (status, _) = ctx.get(&uri, ALICE_TOKEN).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = ctx.get("/api/phones", ALICE_TOKEN).await;
    assert_eq!(list.as_array().unwrap().len(), PHONE_COUNT - 1);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(ALICE_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_is_required() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send(Method::GET, "/api/phones", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], MISSING_TOKEN);

    let (status, body) = ctx.get("/api/phones", "not-a-real-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], INVALID_TOKEN);
}
