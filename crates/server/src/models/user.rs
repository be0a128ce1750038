//! User documents.

use bson::{Document, oid::ObjectId};
use pet_buddy_core::UserRole;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{document_to_json, id_hex};

/// A platform user, keyed by email.
///
/// `last_log_in` keeps the snake-case name and ISO-8601 string form the web
/// client already reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_log_in: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl UserDoc {
    /// The effective role; an absent field means a regular user.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role.unwrap_or_default()
    }
}

/// User as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_log_in: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<UserDoc> for UserView {
    fn from(doc: UserDoc) -> Self {
        let role = doc.role();
        Self {
            id: id_hex(doc.id),
            email: doc.email,
            role,
            last_log_in: doc.last_log_in,
            extra: document_to_json(doc.extra),
        }
    }
}
