//! Command implementations.

pub mod admin;
pub mod indexes;

use mongodb::Database;
use pet_buddy_server::config::StoreConfig;
use pet_buddy_server::db::{self, RepositoryError};

/// Connect to the configured database.
///
/// # Errors
///
/// Returns an error if the store variables are missing or the URI cannot
/// be parsed.
pub async fn open_store() -> Result<Database, Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    let client = db::connect(&config.mongodb_uri).await?;
    tracing::info!(database = %config.database_name, "Connecting to store...");
    Ok(client.database(&config.database_name))
}

/// Round-trip a `ping` to the store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the store is unreachable.
pub async fn ping(db: &Database) -> Result<(), RepositoryError> {
    db::ping(db).await?;
    tracing::info!("Store is reachable");
    Ok(())
}
