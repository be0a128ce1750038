//! Integration tests for user registration.

#![allow(clippy::unwrap_used)]

use pet_buddy_integration_tests::{TestContext, unique};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_duplicate_user_is_not_inserted_twice() {
    let ctx = TestContext::from_env();
    let email = format!("{}@petbuddy.test", unique("user"));

    let (status, first) = ctx
        .anonymous(Method::POST, "/users", Some(json!({ "email": email, "name": "Test" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["insertedId"].is_string());

    let (status, second) = ctx
        .anonymous(Method::POST, "/users", Some(json!({ "email": email, "name": "Again" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "User already exists");
    assert_eq!(second["inserted"], false);
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_new_user_has_user_role() {
    let ctx = TestContext::from_env();
    let email = format!("{}@petbuddy.test", unique("role"));
    ctx.anonymous(Method::POST, "/users", Some(json!({ "email": email, "role": "admin" })))
        .await;

    let (status, body) = ctx
        .anonymous(Method::GET, &format!("/users/role/{email}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}
