//! Admin role commands.
//!
//! # Usage
//!
//! ```bash
//! pb-cli admin promote -e owner@example.com
//! pb-cli admin demote -e owner@example.com
//! ```
//!
//! Only existing users can be promoted. A user record is created the first
//! time someone signs in to the web client.

use mongodb::Database;
use pet_buddy_core::{Email, UserRole};
use pet_buddy_server::db::{RepositoryError, UserRepository};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No user has this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Store error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

/// Grant the admin role.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if the user has never signed in.
pub async fn promote(db: &Database, email: &str) -> Result<(), AdminError> {
    set_role(db, email, UserRole::Admin).await
}

/// Clear the admin role.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if the user has never signed in.
pub async fn demote(db: &Database, email: &str) -> Result<(), AdminError> {
    set_role(db, email, UserRole::User).await
}

async fn set_role(db: &Database, email: &str, role: UserRole) -> Result<(), AdminError> {
    let parsed = parse_email(email)?;

    tracing::info!("Setting role of {} to {}", parsed, role);
    let outcome = UserRepository::new(db)
        .set_role_by_email(&parsed, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.to_owned()),
            other => AdminError::Database(other),
        })?;

    if outcome.modified_count == 0 {
        tracing::info!("{} already had role {}", parsed, role);
    } else {
        tracing::info!("Role updated: {} is now {}", parsed, role);
    }
    Ok(())
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email() {
        assert_eq!(parse_email(" owner@example.com ").unwrap().as_str(), "owner@example.com");
        assert!(matches!(
            parse_email("not-an-email"),
            Err(AdminError::InvalidEmail(raw)) if raw == "not-an-email"
        ));
    }
}
