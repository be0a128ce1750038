//! Adoption request repository.

use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};
use pet_buddy_core::{AdoptionStatus, Email, PageRequest};

use super::{ADOPTION_REQUESTS, RepositoryError, find_page, find_sorted};
use crate::models::{AdoptionRequestDoc, InsertOutcome, UpdateOutcome};

/// Repository for the `adoptionPets` collection.
pub struct AdoptionRepository<'a> {
    db: &'a Database,
}

impl<'a> AdoptionRepository<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<AdoptionRequestDoc> {
        self.db.collection(ADOPTION_REQUESTS)
    }

    /// Get a request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<AdoptionRequestDoc>, RepositoryError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    /// Insert a new request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        request: &AdoptionRequestDoc,
    ) -> Result<InsertOutcome, RepositoryError> {
        Ok(self.collection().insert_one(request).await?.into())
    }

    /// Set the status of a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: ObjectId,
        status: &AdoptionStatus,
    ) -> Result<UpdateOutcome, RepositoryError> {
        Ok(self
            .collection()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?
            .into())
    }

    /// Requests received for pets owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(
        &self,
        owner: &Email,
    ) -> Result<Vec<AdoptionRequestDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "ownerEmail": owner.as_str() },
            doc! { "createdAt": -1 },
        )
        .await
    }

    /// Requests made by `requester`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_requester(
        &self,
        requester: &Email,
    ) -> Result<Vec<AdoptionRequestDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "requesterEmail": requester.as_str() },
            doc! { "createdAt": -1 },
        )
        .await
    }

    /// All requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AdoptionRequestDoc>, u64), RepositoryError> {
        find_page(&self.collection(), doc! {}, doc! { "createdAt": -1 }, page).await
    }

    /// Count requests, optionally for one pet owner and with one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        owner: Option<&Email>,
        status: Option<&AdoptionStatus>,
    ) -> Result<u64, RepositoryError> {
        let mut filter = doc! {};
        if let Some(owner) = owner {
            filter.insert("ownerEmail", owner.as_str());
        }
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        Ok(self.collection().count_documents(filter).await?)
    }
}
