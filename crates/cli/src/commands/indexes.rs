//! Secondary index creation.
//!
//! # Usage
//!
//! ```bash
//! pb-cli indexes create
//! ```
//!
//! Creating an index that already exists with the same keys is a no-op, so
//! the command is safe to re-run.

use bson::{Document, doc};
use mongodb::{Database, IndexModel};
use pet_buddy_server::db::{ADOPTION_REQUESTS, CAMPAIGNS, DONATIONS, PETS, USERS};

/// Index keys per collection.
fn index_plan() -> Vec<(&'static str, Document)> {
    vec![
        (USERS, doc! { "email": 1 }),
        (PETS, doc! { "adoption": 1, "created_at": -1 }),
        (PETS, doc! { "email": 1 }),
        (CAMPAIGNS, doc! { "userEmail": 1 }),
        (DONATIONS, doc! { "campaignId": 1 }),
        (DONATIONS, doc! { "donorEmail": 1 }),
        (ADOPTION_REQUESTS, doc! { "ownerEmail": 1 }),
        (ADOPTION_REQUESTS, doc! { "requesterEmail": 1 }),
    ]
}

/// Create every secondary index.
///
/// # Errors
///
/// Returns the driver error of the first index that cannot be created.
pub async fn create(db: &Database) -> Result<(), mongodb::error::Error> {
    for (collection, keys) in index_plan() {
        let model = IndexModel::builder().keys(keys.clone()).build();
        let created = db
            .collection::<Document>(collection)
            .create_index(model)
            .await?;
        tracing::info!("{}: {} ({})", collection, created.index_name, keys);
    }
    tracing::info!("Indexes ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_covers_listing_filters() {
        let plan = index_plan();
        assert_eq!(plan.len(), 8);
        assert!(
            plan.iter()
                .any(|(c, k)| *c == PETS && k.contains_key("adoption"))
        );
        assert!(
            plan.iter()
                .any(|(c, k)| *c == DONATIONS && k.contains_key("donorEmail"))
        );
    }
}
