//! Newtype IDs for type-safe document references.
//!
//! Documents are keyed by 12-byte object ids, written on the wire as 24
//! lowercase hex characters. Use the `define_id!` macro to create wrappers
//! that prevent mixing up ids of different collections: a `PetId` cannot be
//! handed to a campaign lookup by accident.

use core::fmt::Write as _;

/// Number of bytes in a document id.
pub const ID_LEN: usize = 12;

/// Error returned when a string is not a valid document id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid id: {0:?}")]
pub struct IdError(pub String);

/// Decode a 24-character hex string into id bytes.
///
/// # Errors
///
/// Returns `IdError` if the input is not exactly 24 hex digits.
pub fn parse_hex_id(s: &str) -> Result<[u8; ID_LEN], IdError> {
    let raw = s.trim();
    if raw.len() != ID_LEN * 2 || !raw.is_ascii() {
        return Err(IdError(s.to_owned()));
    }

    let mut out = [0u8; ID_LEN];
    for (slot, pair) in out.iter_mut().zip(raw.as_bytes().chunks_exact(2)) {
        let text = core::str::from_utf8(pair).map_err(|_| IdError(s.to_owned()))?;
        *slot = u8::from_str_radix(text, 16).map_err(|_| IdError(s.to_owned()))?;
    }
    Ok(out)
}

/// Encode id bytes as lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8; ID_LEN]) -> String {
    bytes.iter().fold(String::with_capacity(ID_LEN * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Macro to define a type-safe document id wrapper.
///
/// Creates a newtype around the 12 id bytes with:
/// - `Serialize`/`Deserialize` as a hex string
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `Display` and `FromStr` using the hex form
/// - conversions to and from `bson::oid::ObjectId` (with the `bson` feature)
///
/// # Example
///
/// ```rust
/// # use pet_buddy_core::define_id;
/// define_id!(ToyId);
///
/// let id = ToyId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
/// assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
/// assert!(ToyId::parse("not-an-id").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $crate::types::id::ID_LEN]);

        impl $name {
            /// Parse an id from its 24-character hex form.
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the input is not a valid id.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                $crate::types::id::parse_hex_id(s).map(Self)
            }

            /// Wrap raw id bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; $crate::types::id::ID_LEN]) -> Self {
                Self(bytes)
            }

            /// Get the raw id bytes.
            #[must_use]
            pub const fn bytes(&self) -> [u8; $crate::types::id::ID_LEN] {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&$crate::types::id::to_hex(&self.0))
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&$crate::types::id::to_hex(&self.0))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let raw = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&raw).map_err(::serde::de::Error::custom)
            }
        }

        #[cfg(feature = "bson")]
        impl From<$name> for ::bson::oid::ObjectId {
            fn from(id: $name) -> Self {
                Self::from_bytes(id.0)
            }
        }

        #[cfg(feature = "bson")]
        impl From<::bson::oid::ObjectId> for $name {
            fn from(oid: ::bson::oid::ObjectId) -> Self {
                Self(oid.bytes())
            }
        }

        #[cfg(feature = "bson")]
        impl From<$name> for ::bson::Bson {
            fn from(id: $name) -> Self {
                Self::ObjectId(id.into())
            }
        }
    };
}

// Define ids for every collection
define_id!(UserId);
define_id!(PetId);
define_id!(CampaignId);
define_id!(AdoptionRequestId);
define_id!(DonationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HEX: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

    #[test]
    fn test_parse_and_display() {
        let id = PetId::parse(HEX).unwrap();
        assert_eq!(id.to_string(), HEX);
        assert_eq!(id.bytes()[0], 0x65);
        assert_eq!(id.bytes()[11], 0xf6);
    }

    #[test]
    fn test_parse_accepts_uppercase_and_normalizes() {
        let id = CampaignId::parse(&HEX.to_uppercase()).unwrap();
        assert_eq!(id.to_string(), HEX);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(PetId::parse("").is_err());
        assert!(PetId::parse("65a1f0c2").is_err());
        assert!(PetId::parse("zza1f0c2e4b0a1b2c3d4e5f6").is_err());
        assert!(PetId::parse("65a1f0c2e4b0a1b2c3d4e5f6aa").is_err());
        assert!(PetId::parse("é5a1f0c2e4b0a1b2c3d4e5f").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = DonationId::parse(HEX).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{HEX}\""));
        let back: DonationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<DonationId>("\"123\"").is_err());
    }
}
