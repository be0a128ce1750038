//! User registration, login bookkeeping and role lookup.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use super::{path_email, take_string};
use crate::db::UserRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{CurrentUser, ensure_owner};
use crate::models::{UpdateOutcome, UserDoc, json_to_document};
use crate::state::AppState;

/// Body keys a client may never set on its own user record.
const PROTECTED_FIELDS: &[&str] = &["role", "last_log_in"];

fn required_email(body: &mut Map<String, Value>) -> Result<String> {
    take_string(body, "email")?
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email is required".to_owned()))
}

/// `POST /users`: insert the user unless the email is already registered.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Response> {
    let email = path_email(&required_email(&mut body)?)?;
    let users = UserRepository::new(state.db());

    if users.get_by_email(&email).await?.is_some() {
        return Ok(Json(json!({
            "message": "User already exists",
            "inserted": false,
        }))
        .into_response());
    }

    let user = UserDoc {
        email: email.to_string(),
        extra: json_to_document(body, PROTECTED_FIELDS)?,
        ..UserDoc::default()
    };
    let outcome = users.create(&user).await?;
    info!(email = %email, "Registered user");
    Ok(Json(outcome).into_response())
}

/// `PATCH /users`: stamp `last_log_in` on the user with this email.
#[instrument(skip(state, body))]
pub async fn record_login(
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let email = required_email(&mut body)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let outcome = UserRepository::new(state.db())
        .record_login(email.trim(), &now)
        .await?;
    Ok(Json(outcome))
}

/// `GET /users/role/{email}`: the caller's own role.
#[instrument(skip(state, identity))]
pub async fn role(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;

    let user = UserRepository::new(state.db())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(json!({ "role": user.role() })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::send;

    #[tokio::test]
    async fn test_create_requires_email() {
        let (status, body) = send("POST", "/users", None, Some(r#"{"name":"Ada"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email is required");

        let (status, _) = send("POST", "/users", None, Some(r#"{"email":"nope"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send("POST", "/users", None, Some(r#"{"email":42}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_record_login_requires_email() {
        let (status, body) = send("PATCH", "/users", None, Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email is required");

        let (status, body) = send("PATCH", "/users", None, Some(r#"{"email":"  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email is required");
    }
}
