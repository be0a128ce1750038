//! Campaign repository.

use bson::{Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use pet_buddy_core::{Email, PageRequest};

use super::{CAMPAIGNS, RepositoryError, find_page, find_sorted};
use crate::models::{CampaignDoc, DeleteOutcome, InsertOutcome, UpdateOutcome};

/// Repository for the `campaign` collection.
pub struct CampaignRepository<'a> {
    db: &'a Database,
}

impl<'a> CampaignRepository<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<CampaignDoc> {
        self.db.collection(CAMPAIGNS)
    }

    /// Get a campaign by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<CampaignDoc>, RepositoryError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    /// Insert a new campaign.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, campaign: &CampaignDoc) -> Result<InsertOutcome, RepositoryError> {
        Ok(self.collection().insert_one(campaign).await?.into())
    }

    /// `$set` the given fields on a campaign.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, RepositoryError> {
        Ok(self
            .collection()
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?
            .into())
    }

    /// Atomically add `amount` to the campaign's donated total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn add_donation(
        &self,
        id: ObjectId,
        amount: f64,
    ) -> Result<UpdateOutcome, RepositoryError> {
        Ok(self
            .collection()
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "donatedAmount": amount } },
            )
            .await?
            .into())
    }

    /// Pause or resume a campaign.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_paused(
        &self,
        id: ObjectId,
        paused: bool,
    ) -> Result<UpdateOutcome, RepositoryError> {
        self.update_fields(id, doc! { "paused": paused }).await
    }

    /// Delete a campaign. Its donations are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome, RepositoryError> {
        Ok(self
            .collection()
            .delete_one(doc! { "_id": id })
            .await?
            .into())
    }

    /// All campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CampaignDoc>, RepositoryError> {
        find_sorted(&self.collection(), doc! {}, doc! { "date": -1 }).await
    }

    /// Campaigns run by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: &Email) -> Result<Vec<CampaignDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "userEmail": owner.as_str() },
            doc! { "date": -1 },
        )
        .await
    }

    /// One page of all campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<CampaignDoc>, u64), RepositoryError> {
        find_page(&self.collection(), doc! {}, doc! { "date": -1 }, page).await
    }

    /// Ids of the campaigns run by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ids_by_owner(&self, owner: &Email) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .list_by_owner(owner)
            .await?
            .into_iter()
            .filter_map(|campaign| campaign.id.map(|oid| oid.to_hex()))
            .collect())
    }

    /// Count campaigns, optionally for one owner and one paused state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        owner: Option<&Email>,
        paused: Option<bool>,
    ) -> Result<u64, RepositoryError> {
        let mut filter = doc! {};
        if let Some(owner) = owner {
            filter.insert("userEmail", owner.as_str());
        }
        match paused {
            Some(true) => {
                filter.insert("paused", true);
            }
            // Campaigns created before the flag existed have no `paused` field.
            Some(false) => {
                filter.insert("paused", doc! { "$ne": true });
            }
            None => {}
        }
        Ok(self.collection().count_documents(filter).await?)
    }
}
