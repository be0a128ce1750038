//! User repository.

use bson::{Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use pet_buddy_core::{Email, PageRequest, UserRole};

use super::{RepositoryError, USERS, find_page};
use crate::models::{InsertOutcome, UpdateOutcome, UserDoc};

/// Repository for the `users` collection.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<UserDoc> {
        self.db.collection(USERS)
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserDoc>, RepositoryError> {
        Ok(self
            .collection()
            .find_one(doc! { "email": email.as_str() })
            .await?)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, RepositoryError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    /// Insert a new user. Callers check for an existing email first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user: &UserDoc) -> Result<InsertOutcome, RepositoryError> {
        Ok(self.collection().insert_one(user).await?.into())
    }

    /// Record a login time on the user with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_login(
        &self,
        email: &str,
        at: &str,
    ) -> Result<UpdateOutcome, RepositoryError> {
        Ok(self
            .collection()
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "last_log_in": at } },
            )
            .await?
            .into())
    }

    /// Grant or clear the admin role on the user matched by `filter`.
    async fn set_role(
        &self,
        filter: Document,
        role: UserRole,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let update = match role {
            UserRole::Admin => doc! { "$set": { "role": "admin" } },
            UserRole::User => doc! { "$unset": { "role": "" } },
        };
        Ok(self.collection().update_one(filter, update).await?.into())
    }

    /// Grant or clear the admin role by user id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_role_by_id(
        &self,
        id: ObjectId,
        role: UserRole,
    ) -> Result<UpdateOutcome, RepositoryError> {
        self.set_role(doc! { "_id": id }, role).await
    }

    /// Grant or clear the admin role by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_role_by_email(
        &self,
        email: &Email,
        role: UserRole,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let outcome = self.set_role(doc! { "email": email.as_str() }, role).await?;
        if outcome.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(outcome)
    }

    /// All users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: PageRequest) -> Result<(Vec<UserDoc>, u64), RepositoryError> {
        find_page(&self.collection(), doc! {}, doc! { "_id": -1 }, page).await
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.collection().count_documents(doc! {}).await?)
    }

    /// Count users holding the admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_admins(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .collection()
            .count_documents(doc! { "role": "admin" })
            .await?)
    }
}
