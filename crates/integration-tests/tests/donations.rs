//! Integration tests for campaigns and donations.

#![allow(clippy::unwrap_used)]

use pet_buddy_integration_tests::TestContext;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

async fn start_campaign(ctx: &TestContext) -> String {
    let (status, body) = ctx
        .call(
            Method::POST,
            "/campaigns",
            Some(json!({ "title": "Vet bills", "targetAmount": 500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["insertedId"].as_str().unwrap().to_owned()
}

async fn donated(ctx: &TestContext, id: &str) -> f64 {
    let (_, campaign) = ctx.anonymous(Method::GET, &format!("/campaigns/{id}"), None).await;
    campaign["donatedAmount"].as_f64().unwrap()
}

async fn donations_for(ctx: &TestContext, id: &str) -> usize {
    let (_, list) = ctx
        .anonymous(Method::GET, &format!("/donations/campaign/{id}"), None)
        .await;
    list.as_array().map_or(0, Vec::len)
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_donation_increments_campaign_total() {
    let ctx = TestContext::from_env();
    let id = start_campaign(&ctx).await;
    assert!(donated(&ctx, &id).await.abs() < f64::EPSILON);

    let (status, _) = ctx
        .call(Method::POST, "/donations", Some(json!({ "campaignId": id, "amount": 12.5 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx
        .call(Method::POST, "/donations", Some(json!({ "campaignId": id, "amount": "7.5" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!((donated(&ctx, &id).await - 20.0).abs() < f64::EPSILON);
    assert_eq!(donations_for(&ctx, &id).await, 2);

    ctx.call(Method::DELETE, &format!("/campaigns/{id}"), None).await;
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_invalid_donation_writes_nothing() {
    let ctx = TestContext::from_env();
    let id = start_campaign(&ctx).await;

    for amount in [json!(0), json!(-10), json!("abc"), Value::Null] {
        let (status, body) = ctx
            .call(Method::POST, "/donations", Some(json!({ "campaignId": id, "amount": amount })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{amount}");
        assert_eq!(body["message"], "Invalid donation amount");
    }

    assert!(donated(&ctx, &id).await.abs() < f64::EPSILON);
    assert_eq!(donations_for(&ctx, &id).await, 0);

    ctx.call(Method::DELETE, &format!("/campaigns/{id}"), None).await;
}

#[tokio::test]
#[ignore = "Requires running server and store"]
async fn test_donation_to_unknown_campaign_is_not_found() {
    let ctx = TestContext::from_env();
    let (status, body) = ctx
        .call(
            Method::POST,
            "/donations",
            Some(json!({ "campaignId": "000000000000000000000000", "amount": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Campaign not found");
}
