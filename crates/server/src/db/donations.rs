//! Donation repository.

use bson::{Document, doc};
use mongodb::{Collection, Database};
use pet_buddy_core::{CampaignId, Email, PageRequest};

use super::{DONATIONS, RepositoryError, collect, find_page, find_sorted, sum_field};
use crate::models::{DonationDoc, InsertOutcome};

/// Repository for the `donations` collection.
pub struct DonationRepository<'a> {
    db: &'a Database,
}

impl<'a> DonationRepository<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<DonationDoc> {
        self.db.collection(DONATIONS)
    }

    fn raw(&self) -> Collection<Document> {
        self.db.collection(DONATIONS)
    }

    /// Insert a donation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, donation: &DonationDoc) -> Result<InsertOutcome, RepositoryError> {
        Ok(self.collection().insert_one(donation).await?.into())
    }

    /// Donations to one campaign, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_campaign(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<DonationDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "campaignId": campaign.to_string() },
            doc! { "createdAt": -1 },
        )
        .await
    }

    /// Donations made by `donor`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_donor(&self, donor: &Email) -> Result<Vec<DonationDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "donorEmail": donor.as_str() },
            doc! { "createdAt": -1 },
        )
        .await
    }

    /// The `limit` most recent donations made by `donor`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_by_donor(
        &self,
        donor: &Email,
        limit: i64,
    ) -> Result<Vec<DonationDoc>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! { "donorEmail": donor.as_str() })
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .await?;
        collect(cursor).await
    }

    /// All donations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<DonationDoc>, u64), RepositoryError> {
        find_page(&self.collection(), doc! {}, doc! { "createdAt": -1 }, page).await
    }

    /// Number and sum of donations made by `donor`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_by_donor(&self, donor: &Email) -> Result<(u64, f64), RepositoryError> {
        self.totals(doc! { "donorEmail": donor.as_str() }).await
    }

    /// Number and sum of donations to any of `campaign_ids`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_for_campaigns(
        &self,
        campaign_ids: &[String],
    ) -> Result<(u64, f64), RepositoryError> {
        if campaign_ids.is_empty() {
            return Ok((0, 0.0));
        }
        self.totals(doc! { "campaignId": { "$in": campaign_ids.to_vec() } })
            .await
    }

    /// Number and sum of all donations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_all(&self) -> Result<(u64, f64), RepositoryError> {
        self.totals(doc! {}).await
    }

    async fn totals(&self, filter: Document) -> Result<(u64, f64), RepositoryError> {
        let count = self.raw().count_documents(filter.clone()).await?;
        if count == 0 {
            return Ok((0, 0.0));
        }
        let sum = sum_field(&self.raw(), filter, "amount").await?;
        Ok((count, sum))
    }
}
