//! Stripe payment intents.
//!
//! The server only creates intents; the client confirms the payment with
//! the returned secret. There is no retry, idempotency key or webhook
//! reconciliation.

use std::sync::Arc;

use pet_buddy_core::{Amount, AmountError};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::config::StripeConfig;

/// Currency for every intent the platform creates.
pub const CURRENCY: &str = "usd";

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport failure talking to Stripe.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response had no client secret.
    #[error("payment intent has no client secret")]
    MissingClientSecret,

    /// The amount has no minor-unit form.
    #[error("invalid amount: {0}")]
    Amount(#[from] AmountError),

    /// The configured API base cannot be joined with the endpoint path.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A created payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Stripe REST API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    api_base: Url,
    secret_key: SecretString,
}

impl StripeClient {
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                api_base: config.api_base.clone(),
                secret_key: config.secret_key.clone(),
            }),
        }
    }

    /// Create a card payment intent for `amount` dollars and return its
    /// client secret.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if Stripe rejects the request or cannot be
    /// reached.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn create_payment_intent(&self, amount: Amount) -> Result<String, PaymentError> {
        let form = intent_form(amount)?;
        let url = self.inner.api_base.join("v1/payment_intents")?;

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        info!(intent_id = %intent.id, minor_units = intent.amount, currency = %intent.currency, "Created payment intent");
        intent.client_secret.ok_or(PaymentError::MissingClientSecret)
    }
}

/// Form fields for `POST /v1/payment_intents`.
fn intent_form(amount: Amount) -> Result<Vec<(&'static str, String)>, PaymentError> {
    let minor_units = amount.to_minor_units()?;
    if minor_units <= 0 {
        return Err(PaymentError::Amount(AmountError::NotPositive));
    }
    Ok(vec![
        ("amount", minor_units.to_string()),
        ("currency", CURRENCY.to_owned()),
        ("payment_method_types[]", "card".to_owned()),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_form_in_cents() {
        let amount = Amount::from_json(&json!("19.99")).unwrap();
        let form = intent_form(amount).unwrap();
        assert_eq!(
            form,
            vec![
                ("amount", "1999".to_owned()),
                ("currency", "usd".to_owned()),
                ("payment_method_types[]", "card".to_owned()),
            ]
        );
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        let amount = Amount::from_json(&json!("0.001")).unwrap();
        assert!(matches!(
            intent_form(amount),
            Err(PaymentError::Amount(AmountError::NotPositive))
        ));
    }

    #[test]
    fn test_stripe_error_body() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"Amount must be at least 50 cents"}}"#;
        let parsed: StripeErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.error.message.as_deref(),
            Some("Amount must be at least 50 cents")
        );
    }

    #[test]
    fn test_endpoint_join() {
        let base = Url::parse("https://api.stripe.com").unwrap();
        assert_eq!(
            base.join("v1/payment_intents").unwrap().as_str(),
            "https://api.stripe.com/v1/payment_intents"
        );
    }
}
