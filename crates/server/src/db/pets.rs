//! Pet repository.

use bson::{Document, Regex, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use pet_buddy_core::{Email, PageRequest};

use super::{PETS, RepositoryError, find_page, find_sorted, find_window};
use crate::models::{DeleteOutcome, InsertOutcome, PetDoc, UpdateOutcome};

/// Search parameters for the public adoption listing.
#[derive(Debug, Clone, Default)]
pub struct AvailablePets<'q> {
    /// Case-insensitive substring of the pet name.
    pub search: Option<&'q str>,
    /// Exact `category.value`.
    pub category: Option<&'q str>,
}

impl AvailablePets<'_> {
    /// Filter selecting unadopted pets that match the search.
    ///
    /// The search text is matched literally: regex metacharacters are
    /// escaped before the pattern reaches the store.
    #[must_use]
    pub fn filter(&self) -> Document {
        let mut filter = doc! { "adoption": false };
        if let Some(search) = self.search.map(str::trim).filter(|s| !s.is_empty()) {
            filter.insert(
                "petName",
                Regex {
                    pattern: regex::escape(search),
                    options: "i".to_owned(),
                },
            );
        }
        if let Some(category) = self.category.map(str::trim).filter(|c| !c.is_empty()) {
            filter.insert("category.value", category);
        }
        filter
    }
}

/// Repository for the `pets` collection.
pub struct PetRepository<'a> {
    db: &'a Database,
}

impl<'a> PetRepository<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<PetDoc> {
        self.db.collection(PETS)
    }

    /// Get a pet by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<PetDoc>, RepositoryError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    /// Insert a new pet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, pet: &PetDoc) -> Result<InsertOutcome, RepositoryError> {
        Ok(self.collection().insert_one(pet).await?.into())
    }

    /// `$set` the given fields on a pet.
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

    /// Set the adoption flag on a pet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_adopted(&self, id: ObjectId) -> Result<UpdateOutcome, RepositoryError> {
        self.update_fields(id, doc! { "adoption": true }).await
    }

    /// Delete a pet.
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

    /// One page of unadopted pets, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(
        &self,
        query: &AvailablePets<'_>,
        page: PageRequest,
    ) -> Result<Vec<PetDoc>, RepositoryError> {
        find_window(
            &self.collection(),
            query.filter(),
            doc! { "created_at": -1 },
            page,
        )
        .await
    }

    /// All pets listed by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: &Email) -> Result<Vec<PetDoc>, RepositoryError> {
        find_sorted(
            &self.collection(),
            doc! { "email": owner.as_str() },
            doc! { "created_at": -1 },
        )
        .await
    }

    /// All pets, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: PageRequest) -> Result<(Vec<PetDoc>, u64), RepositoryError> {
        find_page(&self.collection(), doc! {}, doc! { "created_at": -1 }, page).await
    }

    /// Count pets, optionally restricted to one owner and adoption state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        owner: Option<&Email>,
        adopted: Option<bool>,
    ) -> Result<u64, RepositoryError> {
        let mut filter = doc! {};
        if let Some(owner) = owner {
            filter.insert("email", owner.as_str());
        }
        if let Some(adopted) = adopted {
            filter.insert("adoption", adopted);
        }
        Ok(self.collection().count_documents(filter).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn test_filter_defaults_to_unadopted() {
        let filter = AvailablePets::default().filter();
        assert_eq!(filter, doc! { "adoption": false });
    }

    #[test]
    fn test_filter_blank_search_and_category_are_ignored() {
        let filter = AvailablePets {
            search: Some("  "),
            category: Some(""),
        }
        .filter();
        assert_eq!(filter, doc! { "adoption": false });
    }

    #[test]
    fn test_filter_escapes_search() {
        let filter = AvailablePets {
            search: Some("Rex (2)*"),
            category: Some("dog"),
        }
        .filter();
        let Some(Bson::RegularExpression(regex)) = filter.get("petName") else {
            panic!("expected a regex on petName");
        };
        assert_eq!(regex.pattern, r"Rex \(2\)\*");
        assert_eq!(regex.options, "i");
        assert_eq!(filter.get_str("category.value").unwrap(), "dog");
        assert!(!filter.get_bool("adoption").unwrap());
    }
}
