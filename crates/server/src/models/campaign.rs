//! Donation campaigns.

use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Timestamp, document_to_json, id_hex, loose_number};

/// Fields a client may never overwrite through `PUT /campaigns/{id}`.
pub const PROTECTED_FIELDS: &[&str] = &["userEmail", "donatedAmount"];

/// A fundraising campaign for a pet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_email: String,
    #[serde(default, deserialize_with = "loose_number")]
    pub target_amount: f64,
    #[serde(default, deserialize_with = "loose_number")]
    pub donated_amount: f64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Campaign as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_email: String,
    pub target_amount: f64,
    pub donated_amount: f64,
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<CampaignDoc> for CampaignView {
    fn from(doc: CampaignDoc) -> Self {
        Self {
            id: id_hex(doc.id),
            user_email: doc.user_email,
            target_amount: doc.target_amount,
            donated_amount: doc.donated_amount,
            paused: doc.paused,
            date: doc.date.map(|ts| ts.0),
            extra: document_to_json(doc.extra),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_loose_amounts_and_defaults() {
        let campaign: CampaignDoc = bson::from_document(doc! {
            "userEmail": "o@x.io",
            "targetAmount": "500",
            "petName": "Rex",
        })
        .unwrap();
        assert!((campaign.target_amount - 500.0).abs() < f64::EPSILON);
        assert!(campaign.donated_amount.abs() < f64::EPSILON);
        assert!(!campaign.paused);
        assert!(campaign.date.is_none());
        assert_eq!(campaign.extra.get_str("petName").unwrap(), "Rex");
    }

    #[test]
    fn test_view_shape() {
        let oid = ObjectId::new();
        let campaign = CampaignDoc {
            id: Some(oid),
            user_email: "o@x.io".into(),
            target_amount: 100.0,
            donated_amount: 25.5,
            ..CampaignDoc::default()
        };
        let view = serde_json::to_value(CampaignView::from(campaign)).unwrap();
        assert_eq!(view["_id"], oid.to_hex());
        assert_eq!(view["userEmail"], "o@x.io");
        assert_eq!(view["donatedAmount"], 25.5);
        assert_eq!(view["paused"], false);
    }
}
