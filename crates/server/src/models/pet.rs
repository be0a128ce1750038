//! Pet listings.

use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Timestamp, document_to_json, id_hex};

/// Fields a client may never overwrite through `PUT /pets/{id}`.
pub const PROTECTED_FIELDS: &[&str] = &["email", "adoption", "created_at"];

/// A pet listed for adoption.
///
/// `category` is a `{label, value}` object from the web client's select
/// box and stays in `extra`; filtering reads `category.value` directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(rename = "petName", default, skip_serializing_if = "Option::is_none")]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub adoption: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Document,
}

impl PetDoc {
    /// A new, unadopted listing owned by `email`.
    #[must_use]
    pub fn new(email: String, pet_name: Option<String>, extra: Document) -> Self {
        Self {
            id: None,
            email,
            pet_name,
            adoption: false,
            created_at: Some(Timestamp::now()),
            extra,
        }
    }
}

/// Pet as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PetView {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(rename = "petName", skip_serializing_if = "Option::is_none")]
    pub pet_name: Option<String>,
    pub adoption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<PetDoc> for PetView {
    fn from(doc: PetDoc) -> Self {
        Self {
            id: id_hex(doc.id),
            email: doc.email,
            pet_name: doc.pet_name,
            adoption: doc.adoption,
            created_at: doc.created_at.map(|ts| ts.0),
            extra: document_to_json(doc.extra),
        }
    }
}
