//! Payment intents for card donations.

use axum::{Json, extract::State};
use pet_buddy_core::Amount;
use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::error::{AppError, AppJson, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// `POST /create-payment-intent`: `{amount}` in dollars → `{clientSecret}`.
#[instrument(skip(state, identity, body), fields(email = %identity.email))]
pub async fn create_intent(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<Value>> {
    let amount = body
        .get("amount")
        .and_then(|v| Amount::from_json(v).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid amount".to_owned()))?;

    let client_secret = state.stripe().create_payment_intent(amount).await?;
    Ok(Json(json!({ "clientSecret": client_secret })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{OWNER_TOKEN, send};

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        for body in ["{}", r#"{"amount":0}"#, r#"{"amount":-1}"#, r#"{"amount":"free"}"#] {
            let (status, json) =
                send("POST", "/create-payment-intent", Some(OWNER_TOKEN), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["message"], "Invalid amount", "{body}");
        }
    }

    #[tokio::test]
    async fn test_sub_cent_amount_rejected_without_provider_call() {
        let (status, _) = send(
            "POST",
            "/create-payment-intent",
            Some(OWNER_TOKEN),
            Some(r#"{"amount":0.001}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_internal_error() {
        // The test config points Stripe at a closed local port.
        let (status, json) = send(
            "POST",
            "/create-payment-intent",
            Some(OWNER_TOKEN),
            Some(r#"{"amount":25}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error");
    }
}
