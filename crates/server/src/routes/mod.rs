//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                  - Banner
//! GET    /health                            - Liveness
//! GET    /health/ready                      - Store readiness
//!
//! # Users
//! POST   /users                             - Register (public)
//! PATCH  /users                             - Record login (public)
//! GET    /users/role/{email}                - Own role
//!
//! # Pets
//! POST   /pets                              - List a pet
//! GET    /pets/available                    - Adoptable pets (public, paged)
//! GET    /pets/{id}                         - Pet detail (public)
//! PUT    /pets/{id}                         - Edit (owner or admin)
//! DELETE /pets/{id}                         - Remove (owner or admin)
//! PATCH  /pets/adopt/{id}                   - Mark adopted (owner or admin)
//! GET    /pets/user/{email}                 - Own pets
//!
//! # Adoption requests
//! POST   /pet/adoptions                     - Request to adopt
//! PATCH  /pet/adoptions/{id}                - Set status (pet owner or admin)
//! GET    /pet/adoptions/user/{email}        - Requests received
//! GET    /pet/adoptions/requester/{email}   - Requests made
//!
//! # Campaigns
//! POST   /campaigns                         - Start a campaign
//! GET    /campaigns/available               - All campaigns (public)
//! GET    /campaigns/{id}                    - Campaign detail (public)
//! PUT    /campaigns/{id}                    - Edit (owner or admin)
//! DELETE /campaigns/{id}                    - Remove (owner or admin)
//! GET    /campaigns/user/{email}            - Own campaigns
//! PATCH  /campaigns/donate/{id}             - Add to donated total
//! PATCH  /campaigns/pause/{id}              - Pause / resume (owner or admin)
//!
//! # Donations
//! POST   /donations                         - Donate
//! GET    /donations/campaign/{id}           - Donations to a campaign (public)
//! GET    /donations/user/{email}            - Own donations
//!
//! # Payments
//! POST   /create-payment-intent             - Stripe client secret
//!
//! # Dashboards
//! GET    /dashboard/user/{email}            - Own summary
//! GET    /dashboard/admin                   - Platform summary (admin)
//!
//! # Admin listings (admin)
//! GET    /allUsers/admin                    - Users
//! PATCH  /allUsers/admin/{id}/role          - Grant / clear admin role
//! GET    /allPets/admin                     - Pets
//! GET    /allCampaigns/admin                - Campaigns
//! GET    /allDonations/admin                - Donations
//! GET    /allAdoptions/admin                - Adoption requests
//! ```

pub mod admin;
pub mod adoptions;
pub mod campaigns;
pub mod dashboard;
pub mod donations;
pub mod health;
pub mod payments;
pub mod pets;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};
use bson::oid::ObjectId;
use pet_buddy_core::{AdoptionRequestId, CampaignId, Email, PetId, UserId};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::state::AppState;

/// All application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/users", post(users::create).patch(users::record_login))
        .route("/users/role/{email}", get(users::role))
        .merge(pet_routes())
        .merge(adoption_routes())
        .merge(campaign_routes())
        .route("/donations", post(donations::create))
        .route("/donations/campaign/{id}", get(donations::for_campaign))
        .route("/donations/user/{email}", get(donations::for_donor))
        .route("/create-payment-intent", post(payments::create_intent))
        .route("/dashboard/user/{email}", get(dashboard::user_summary))
        .route("/dashboard/admin", get(dashboard::admin_summary))
        .merge(admin_routes())
}

fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/pets", post(pets::create))
        .route("/pets/available", get(pets::available))
        .route(
            "/pets/{id}",
            get(pets::get).put(pets::update).delete(pets::delete),
        )
        .route("/pets/adopt/{id}", patch(pets::adopt))
        .route("/pets/user/{email}", get(pets::for_owner))
}

fn adoption_routes() -> Router<AppState> {
    Router::new()
        .route("/pet/adoptions", post(adoptions::create))
        .route("/pet/adoptions/{id}", patch(adoptions::set_status))
        .route("/pet/adoptions/user/{email}", get(adoptions::for_owner))
        .route(
            "/pet/adoptions/requester/{email}",
            get(adoptions::for_requester),
        )
}

fn campaign_routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", post(campaigns::create))
        .route("/campaigns/available", get(campaigns::available))
        .route(
            "/campaigns/{id}",
            get(campaigns::get)
                .put(campaigns::update)
                .delete(campaigns::delete),
        )
        .route("/campaigns/user/{email}", get(campaigns::for_owner))
        .route("/campaigns/donate/{id}", patch(campaigns::donate))
        .route("/campaigns/pause/{id}", patch(campaigns::pause))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/allUsers/admin", get(admin::users))
        .route("/allUsers/admin/{id}/role", patch(admin::set_role))
        .route("/allPets/admin", get(admin::pets))
        .route("/allCampaigns/admin", get(admin::campaigns))
        .route("/allDonations/admin", get(admin::donations))
        .route("/allAdoptions/admin", get(admin::adoptions))
}

// =============================================================================
// Shared request helpers
// =============================================================================

/// `?page=&limit=` query, parsed leniently by `PageRequest`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub(crate) fn pet_oid(raw: &str) -> Result<ObjectId, AppError> {
    PetId::parse(raw)
        .map(ObjectId::from)
        .map_err(|_| AppError::BadRequest("Invalid pet id".to_owned()))
}

pub(crate) fn campaign_oid(raw: &str) -> Result<ObjectId, AppError> {
    CampaignId::parse(raw)
        .map(ObjectId::from)
        .map_err(|_| AppError::BadRequest("Invalid campaign id".to_owned()))
}

pub(crate) fn adoption_oid(raw: &str) -> Result<ObjectId, AppError> {
    AdoptionRequestId::parse(raw)
        .map(ObjectId::from)
        .map_err(|_| AppError::BadRequest("Invalid adoption request id".to_owned()))
}

pub(crate) fn user_oid(raw: &str) -> Result<ObjectId, AppError> {
    UserId::parse(raw)
        .map(ObjectId::from)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_owned()))
}

/// An email from a path segment.
pub(crate) fn path_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))
}

/// Remove an optional string field from a request body.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the field is present but not a string.
pub(crate) fn take_string(
    body: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<String>, AppError> {
    match body.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AppError::BadRequest(format!("{key} must be a string"))),
    }
}

/// Reject a body that names someone other than the caller in `key`.
pub(crate) fn check_claimed_email(
    body: &mut Map<String, Value>,
    key: &str,
    identity: &crate::services::Identity,
) -> Result<(), AppError> {
    if let Some(claimed) = take_string(body, key)? {
        crate::middleware::ensure_owner(identity, &claimed)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Router harness: static tokens and a store client that never connects.

    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;
    use url::Url;

    use crate::config::{FirebaseConfig, ServerConfig, StripeConfig};
    use crate::services::identity::StaticVerifier;
    use crate::state::AppState;

    pub const OWNER_TOKEN: &str = "owner-token";
    pub const OWNER_EMAIL: &str = "owner@petbuddy.test";
    pub const OTHER_EMAIL: &str = "other@petbuddy.test";

    pub fn config() -> ServerConfig {
        ServerConfig {
            mongodb_uri: SecretString::from("mongodb://127.0.0.1:1"),
            database_name: "petBuddyTest".to_owned(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            cors_allowed_origins: Vec::new(),
            json_logs: false,
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51NzQ8hK3xPq7Lm2Vb9Rt4Wy6Ud0Fg"),
                api_base: Url::parse("http://127.0.0.1:1").unwrap(),
            },
            firebase: FirebaseConfig {
                project_id: "pet-buddy-test".to_owned(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    pub async fn app() -> axum::Router {
        let client = mongodb::Client::with_uri_str(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100&connectTimeoutMS=100",
        )
        .await
        .unwrap();
        let verifier = StaticVerifier::default().with(OWNER_TOKEN, "uid-owner", OWNER_EMAIL);
        crate::app(AppState::with_verifier(config(), &client, Arc::new(verifier)))
    }

    /// Send a request and return status plus parsed JSON body (or `Null`).
    pub async fn send(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_owned())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_take_string() {
        let Value::Object(mut body) = json!({"a": "x", "b": 3, "c": null}) else {
            unreachable!()
        };
        assert_eq!(take_string(&mut body, "a").unwrap(), Some("x".to_owned()));
        assert!(take_string(&mut body, "b").is_err());
        assert_eq!(take_string(&mut body, "c").unwrap(), None);
        assert_eq!(take_string(&mut body, "missing").unwrap(), None);
        assert!(body.is_empty());
    }

    #[test]
    fn test_id_helpers_reject_garbage() {
        assert!(pet_oid("65a1f0c2e4b0a1b2c3d4e5f6").is_ok());
        assert!(matches!(pet_oid("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(campaign_oid(""), Err(AppError::BadRequest(_))));
        assert!(matches!(
            adoption_oid("zzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(user_oid("123"), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_auth_routes_require_bearer_token() {
        let cases = [
            ("GET", "/users/role/owner@petbuddy.test"),
            ("POST", "/pets"),
            ("PUT", "/pets/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("DELETE", "/pets/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("PATCH", "/pets/adopt/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("GET", "/pets/user/owner@petbuddy.test"),
            ("POST", "/pet/adoptions"),
            ("PATCH", "/pet/adoptions/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("GET", "/pet/adoptions/user/owner@petbuddy.test"),
            ("GET", "/pet/adoptions/requester/owner@petbuddy.test"),
            ("POST", "/campaigns"),
            ("PUT", "/campaigns/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("DELETE", "/campaigns/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("GET", "/campaigns/user/owner@petbuddy.test"),
            ("PATCH", "/campaigns/donate/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("PATCH", "/campaigns/pause/65a1f0c2e4b0a1b2c3d4e5f6"),
            ("POST", "/donations"),
            ("GET", "/donations/user/owner@petbuddy.test"),
            ("POST", "/create-payment-intent"),
            ("GET", "/dashboard/user/owner@petbuddy.test"),
            ("GET", "/dashboard/admin"),
            ("GET", "/allUsers/admin"),
            ("PATCH", "/allUsers/admin/65a1f0c2e4b0a1b2c3d4e5f6/role"),
            ("GET", "/allPets/admin"),
            ("GET", "/allCampaigns/admin"),
            ("GET", "/allDonations/admin"),
            ("GET", "/allAdoptions/admin"),
        ];
        for (method, uri) in cases {
            let (status, body) = send(method, uri, None, Some("{}")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["message"], "Unauthorized access", "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let (status, body) = send(
            "GET",
            "/dashboard/user/owner@petbuddy.test",
            Some("forged"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized access");
    }

    #[tokio::test]
    async fn test_per_user_listings_reject_other_emails() {
        let uris = [
            "/users/role/other@petbuddy.test",
            "/pets/user/other@petbuddy.test",
            "/pet/adoptions/user/other@petbuddy.test",
            "/pet/adoptions/requester/other@petbuddy.test",
            "/campaigns/user/other@petbuddy.test",
            "/donations/user/other@petbuddy.test",
            "/dashboard/user/other@petbuddy.test",
        ];
        for uri in uris {
            let (status, body) = send("GET", uri, Some(OWNER_TOKEN), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body["message"], "Forbidden access", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = send("POST", "/users", None, Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, _) = send("POST", "/users", None, Some("[1, 2]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
