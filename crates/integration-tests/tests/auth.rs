//! Integration tests for authentication and ownership checks.
//!
//! These tests require:
//! - The server running (cargo run -p pet-buddy-server)
//! - A reachable store
//! - `PETBUDDY_TEST_TOKEN` / `PETBUDDY_TEST_EMAIL`

#![allow(clippy::unwrap_used)]

use pet_buddy_integration_tests::TestContext;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_banner_and_health() {
    let ctx = TestContext::from_env();
    let banner = ctx
        .client
        .get(ctx.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(banner, "Successfully running petBuddy server!");

    let (status, _) = ctx.anonymous(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_auth_routes_reject_missing_token() {
    let ctx = TestContext::from_env();
    let email = ctx.email.clone();
    let routes = [
        (Method::POST, "/pets".to_owned()),
        (Method::GET, format!("/pets/user/{email}")),
        (Method::POST, "/campaigns".to_owned()),
        (Method::POST, "/donations".to_owned()),
        (Method::POST, "/create-payment-intent".to_owned()),
        (Method::GET, format!("/dashboard/user/{email}")),
        (Method::GET, "/dashboard/admin".to_owned()),
        (Method::GET, "/allUsers/admin".to_owned()),
    ];
    for (method, path) in routes {
        let (status, body) = ctx.anonymous(method, &path, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["message"], "Unauthorized access", "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_other_users_dashboard_is_forbidden() {
    let ctx = TestContext::from_env();
    let (status, body) = ctx
        .call(Method::GET, "/dashboard/user/someone-else@petbuddy.test", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden access");

    let path = format!("/dashboard/user/{}", ctx.email);
    let (status, body) = ctx.call(Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["recentDonations"].is_array());
}
