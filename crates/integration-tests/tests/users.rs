//! Users over HTTP: tenant scoping and the ownership check.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use bilemo_api::authz::ACCESS_DENIED;
use bilemo_api::db::RecordReader;
use bilemo_api::models::User;
use bilemo_integration_tests::{ALICE_TOKEN, BOB_TOKEN, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_list_shows_only_own_users() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/users", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "alice-one");
    assert_eq!(users[1]["username"], "alice-two");
    assert!(users.iter().all(|u| u.get("customer").is_none()));
    assert_eq!(
        users[0]["_links"]["self"]["href"],
        format!("/api/users/{}", ctx.alice_users[0].id)
    );

    let (_, body) = ctx.get("/api/users", BOB_TOKEN).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "bob-one");
}

#[tokio::test]
async fn test_page_past_own_users_is_not_found() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get("/api/users?page=2", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repeated_page_is_not_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/users?page=1&page=9", ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_undecodable_user_id_is_not_found() {
    let ctx = TestContext::new().await;

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = ctx
            .send(method, "/api/users/%FF", Some(ALICE_TOKEN), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Error : User object not found");
    }
}

#[tokio::test]
async fn test_owner_sees_user_detail() {
    let ctx = TestContext::new().await;
    let user = &ctx.alice_users[0];

    let (status, body) = ctx.get(&format!("/api/users/{}", user.id), ALICE_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice-one@orange.fr");
}

#[tokio::test]
async fn test_other_customer_is_refused_every_action() {
    let ctx = TestContext::new().await;
    let user = ctx.alice_users[0].clone();
    let uri = format!("/api/users/{}", user.id);
    let expected = format!("Error : {ACCESS_DENIED}");

    let (status, body) = ctx.get(&uri, BOB_TOKEN).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], expected);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(BOB_TOKEN), Some(&json!({ "name": "Mallory" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], expected);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(BOB_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], expected);

    let stored = RecordReader::<User>::get(ctx.store.as_ref(), user.id)
        .await
        .unwrap();
    assert_eq!(stored, Some(user));
}

#[tokio::test]
async fn test_created_user_belongs_to_caller() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(BOB_TOKEN),
            Some(&json!({
                "username": "bob-two",
                "name": "Paul",
                "surname": "Martin",
                "email": "paul@free.fr"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User has been added to the database !");

    let (_, body) = ctx.get("/api/users", BOB_TOKEN).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (_, body) = ctx.get("/api/users", ALICE_TOKEN).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(ALICE_TOKEN),
            Some(&json!({
                "username": "carol",
                "name": "Carol",
                "surname": "Petit",
                "email": "not-an-email"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error_details"]["email"].is_array());
}

#[tokio::test]
async fn test_owner_updates_name() {
    let ctx = TestContext::new().await;
    let user = &ctx.alice_users[1];
    let uri = format!("/api/users/{}", user.id);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(ALICE_TOKEN), Some(&json!({ "name": "Jeanne" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("User : {} has been updated !", user.id));

    let (_, body) = ctx.get(&uri, ALICE_TOKEN).await;
    assert_eq!(body["name"], "Jeanne");
    assert_eq!(body["surname"], "Dupont");
}

#[tokio::test]
async fn test_owner_deletes_user() {
    let ctx = TestContext::new().await;
    let uri = format!("/api/users/{}", ctx.alice_users[0].id);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(ALICE_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User has been removed !");

    let (status, body) = ctx.get(&uri, ALICE_TOKEN).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Error : User object not found");
}
