//! Document models and their JSON views.
//!
//! Every collection has a `*Doc` type (what is stored) and a `*View` type
//! (what is returned). Documents are loosely typed: fields the server does
//! not interpret are kept in an `extra` map on insert and echoed back on
//! read, so clients can attach descriptive data (images, descriptions,
//! names) without a schema change.

pub mod adoption;
pub mod campaign;
pub mod donation;
pub mod pet;
pub mod user;

pub use adoption::{AdoptionRequestDoc, AdoptionRequestView};
pub use campaign::{CampaignDoc, CampaignView};
pub use donation::{DonationDoc, DonationView};
pub use pet::{PetDoc, PetView};
pub use user::{UserDoc, UserView};

use bson::{Bson, Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A timestamp stored as a BSON date.
///
/// Older documents carry ISO-8601 strings or epoch milliseconds written by
/// the web client; all three forms are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bson::DateTime::from_chrono(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match Bson::deserialize(deserializer)? {
            Bson::DateTime(dt) => Ok(Self(dt.to_chrono())),
            Bson::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Self(dt.with_timezone(&Utc)))
                .map_err(D::Error::custom),
            Bson::Int64(ms) => DateTime::from_timestamp_millis(ms)
                .map(Self)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
            other => Err(D::Error::custom(format!(
                "expected a date, got {:?}",
                other.element_type()
            ))),
        }
    }
}

/// Read a number that may have been stored as int, double or numeric string.
pub(crate) fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(bson_number(&Bson::deserialize(deserializer)?).unwrap_or(0.0))
}

/// Numeric value of a BSON element, if it has one.
#[allow(clippy::cast_precision_loss)] // Document amounts are far below 2^52
pub(crate) fn bson_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render an untyped document as plain JSON (relaxed extended JSON).
#[must_use]
pub fn document_to_json(doc: Document) -> Map<String, Value> {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Convert client-supplied JSON fields into a document, dropping keys the
/// client may never set directly.
///
/// # Errors
///
/// Returns an error if a value cannot be represented in BSON.
pub fn json_to_document(
    mut fields: Map<String, Value>,
    protected: &[&str],
) -> Result<Document, bson::ser::Error> {
    fields.remove("_id");
    for key in protected {
        fields.remove(*key);
    }
    bson::to_document(&fields)
}

/// Hex form of an id, or an empty string for documents not yet inserted.
#[must_use]
pub fn id_hex(id: Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

// =============================================================================
// Write outcomes (driver result shape)
// =============================================================================

/// Result of an insert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl From<InsertOneResult> for InsertOutcome {
    fn from(result: InsertOneResult) -> Self {
        let inserted_id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.into_relaxed_extjson().to_string(),
        };
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Result of an update.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateOutcome {
    fn from(result: UpdateResult) -> Self {
        Self {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        }
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteOutcome {
    fn from(result: DeleteResult) -> Self {
        Self {
            acknowledged: true,
            deleted_count: result.deleted_count,
        }
    }
}

/// A page of listing results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub next_page: Option<u64>,
}
