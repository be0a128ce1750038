//! Authentication extractors and ownership checks.
//!
//! Callers authenticate with `Authorization: Bearer <firebase id token>`.
//! Ownership is decided by comparing an email on the resource (or in the
//! path) with the email of the verified identity; a mismatch is a hard 403.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::UserDoc;
use crate::services::Identity;
use crate::state::AppState;

/// Extractor that requires a verified bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(identity): CurrentUser) -> String {
///     identity.email.to_string()
/// }
/// ```
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

        let identity = state.verifier().verify(token).await?;

        Span::current().record("uid", identity.uid.as_str());
        set_sentry_user(&identity.uid, identity.email.as_str());

        Ok(Self(identity))
    }
}

/// Extractor that requires a verified caller whose user record has the
/// admin role.
pub struct RequireAdmin {
    pub identity: Identity,
    pub user: UserDoc,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        let user = UserRepository::new(state.db())
            .get_by_email(&identity.email)
            .await?
            .filter(|user| user.role().is_admin())
            .ok_or_else(|| AppError::Forbidden(format!("{} is not an admin", identity.email)))?;

        Ok(Self { identity, user })
    }
}

/// Token from an `Authorization: Bearer ...` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject unless `email` is the caller's own.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on mismatch.
pub fn ensure_owner(identity: &Identity, email: &str) -> Result<(), AppError> {
    if identity.email.matches(email) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} may not act for {}",
            identity.email,
            email.trim()
        )))
    }
}

/// Reject unless the caller owns the resource or is an admin.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when neither holds, or
/// `AppError::Database` if the role lookup fails.
pub async fn ensure_owner_or_admin(
    state: &AppState,
    identity: &Identity,
    owner_email: &str,
) -> Result<(), AppError> {
    if identity.email.matches(owner_email) {
        return Ok(());
    }
    let is_admin = UserRepository::new(state.db())
        .get_by_email(&identity.email)
        .await?
        .is_some_and(|user| user.role().is_admin());
    if is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} does not own this resource",
            identity.email
        )))
    }
}
