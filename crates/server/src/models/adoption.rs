//! Adoption requests.

use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use pet_buddy_core::AdoptionStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Timestamp, document_to_json, id_hex};

/// A request by one user to adopt another user's pet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_email: String,
    #[serde(default)]
    pub requester_email: String,
    #[serde(default)]
    pub pet_id: String,
    #[serde(default)]
    pub status: AdoptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Adoption request as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestView {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_email: String,
    pub requester_email: String,
    pub pet_id: String,
    pub status: AdoptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<AdoptionRequestDoc> for AdoptionRequestView {
    fn from(doc: AdoptionRequestDoc) -> Self {
        Self {
            id: id_hex(doc.id),
            owner_email: doc.owner_email,
            requester_email: doc.requester_email,
            pet_id: doc.pet_id,
            status: doc.status,
            created_at: doc.created_at.map(|ts| ts.0),
            extra: document_to_json(doc.extra),
        }
    }
}
