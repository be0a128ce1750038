//! Status and role values stored on documents.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Status of an adoption request.
///
/// Status is free text in the store: only `"pending"` (set on insert) and
/// `"accepted"` (which marks the pet adopted) carry meaning. Any other value
/// is kept verbatim and has no side effects. Transitions are not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdoptionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Other(String),
}

impl AdoptionStatus {
    /// Parse a status, returning `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self::from(raw.to_owned()))
    }

    /// Whether setting this status cascades to the pet's adoption flag.
    #[must_use]
    pub const fn marks_pet_adopted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The stored string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for AdoptionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            _ => Self::Other(s),
        }
    }
}

impl From<AdoptionStatus> for String {
    fn from(status: AdoptionStatus) -> Self {
        match status {
            AdoptionStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a platform user.
///
/// The `role` field is absent for regular users. Only `"admin"` grants
/// anything; unrecognized values are read as [`UserRole::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adoption_status_known_values() {
        assert_eq!(AdoptionStatus::parse("accepted"), Some(AdoptionStatus::Accepted));
        assert_eq!(AdoptionStatus::parse(" pending "), Some(AdoptionStatus::Pending));
        assert_eq!(AdoptionStatus::parse("rejected"), Some(AdoptionStatus::Rejected));
        assert_eq!(AdoptionStatus::parse(""), None);
    }

    #[test]
    fn test_adoption_status_free_text_preserved() {
        let status = AdoptionStatus::parse("on hold").unwrap();
        assert_eq!(status, AdoptionStatus::Other("on hold".to_owned()));
        assert_eq!(String::from(status), "on hold");
    }

    #[test]
    fn test_only_accepted_cascades() {
        assert!(AdoptionStatus::Accepted.marks_pet_adopted());
        assert!(!AdoptionStatus::Pending.marks_pet_adopted());
        assert!(!AdoptionStatus::Rejected.marks_pet_adopted());
        // Case matters: the stored value is compared verbatim.
        assert!(!AdoptionStatus::parse("Accepted").unwrap().marks_pet_adopted());
    }

    #[test]
    fn test_adoption_status_serde() {
        let json = serde_json::to_string(&AdoptionStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        let back: AdoptionStatus = serde_json::from_str("\"waitlisted\"").unwrap();
        assert_eq!(back.as_str(), "waitlisted");
    }

    #[test]
    fn test_user_role_unknown_is_user() {
        let admin: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(admin.is_admin());
        let other: UserRole = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(other, UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!("root".parse::<UserRole>().is_err());
    }
}
