//! Document store access.
//!
//! # Database: `petBuddyDB`
//!
//! ## Collections
//!
//! - `users` - Platform users, keyed by email
//! - `pets` - Pets listed for adoption
//! - `campaign` - Fundraising campaigns
//! - `adoptionPets` - Adoption requests
//! - `donations` - Donations to campaigns
//!
//! Collection names predate this service and are kept for data
//! compatibility. Secondary indexes are created by `pb-cli indexes create`.

pub mod adoptions;
pub mod campaigns;
pub mod donations;
pub mod pets;
pub mod users;

use std::time::Duration;

pub use adoptions::AdoptionRepository;
pub use campaigns::CampaignRepository;
pub use donations::DonationRepository;
pub use pets::{AvailablePets, PetRepository};
pub use users::UserRepository;

use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Cursor, Database};
use pet_buddy_core::PageRequest;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

pub const USERS: &str = "users";
pub const PETS: &str = "pets";
pub const CAMPAIGNS: &str = "campaign";
pub const ADOPTION_REQUESTS: &str = "adoptionPets";
pub const DONATIONS: &str = "donations";

/// Fail fast when the store is unreachable instead of hanging a request.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Error from the `MongoDB` driver.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A stored reference is not a valid id.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Build a `MongoDB` client.
///
/// The driver connects lazily; the first operation (or [`ping`]) surfaces
/// connection failures.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the URI cannot be parsed or
/// resolved.
pub async fn connect(uri: &SecretString) -> Result<Client, RepositoryError> {
    let mut options = ClientOptions::parse(uri.expose_secret()).await?;
    options.app_name = Some("pet-buddy-server".to_owned());
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    options.connect_timeout = Some(CONNECT_TIMEOUT);
    Ok(Client::with_options(options)?)
}

/// Round-trip a `ping` command to the store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the store does not answer.
pub async fn ping(db: &Database) -> Result<(), RepositoryError> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

/// Drain a cursor into a vector.
async fn collect<T>(cursor: Cursor<T>) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    Ok(cursor.try_collect().await?)
}

/// Find documents matching `filter` in `sort` order.
async fn find_sorted<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    collect(collection.find(filter).sort(sort).await?).await
}

/// One page of documents matching `filter` plus the total match count.
async fn find_page<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    page: PageRequest,
) -> Result<(Vec<T>, u64), RepositoryError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection.count_documents(filter.clone()).await?;
    let items = find_window(collection, filter, sort, page).await?;
    Ok((items, total))
}

/// One page of documents matching `filter`, without a count.
async fn find_window<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    page: PageRequest,
) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection
        .find(filter)
        .sort(sort)
        .skip(page.skip())
        .limit(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .await?;
    collect(cursor).await
}

/// Sum a numeric field over matching documents.
///
/// Values stored as strings are converted; anything unconvertible counts
/// as zero.
async fn sum_field(
    collection: &Collection<Document>,
    filter: Document,
    field: &str,
) -> Result<f64, RepositoryError> {
    let pipeline = vec![
        doc! { "$match": filter },
        doc! { "$group": {
            "_id": null,
            "total": { "$sum": {
                "$convert": {
                    "input": format!("${field}"),
                    "to": "double",
                    "onError": 0,
                    "onNull": 0,
                }
            }},
        }},
    ];
    let mut cursor = collection.aggregate(pipeline).await?;
    let Some(row) = cursor.try_next().await? else {
        return Ok(0.0);
    };
    row.get("total")
        .and_then(crate::models::bson_number)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("non-numeric sum of {field}")))
}
