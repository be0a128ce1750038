//! Donations to campaigns.

use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Timestamp, document_to_json, id_hex, loose_number};

/// A single donation. `campaignId` is the hex id of the campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub donor_email: String,
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default, deserialize_with = "loose_number")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Donation as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    #[serde(rename = "_id")]
    pub id: String,
    pub donor_email: String,
    pub campaign_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<DonationDoc> for DonationView {
    fn from(doc: DonationDoc) -> Self {
        Self {
            id: id_hex(doc.id),
            donor_email: doc.donor_email,
            campaign_id: doc.campaign_id,
            amount: doc.amount,
            created_at: doc.created_at.map(|ts| ts.0),
            extra: document_to_json(doc.extra),
        }
    }
}
