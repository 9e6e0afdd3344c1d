//! Strongly typed entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier must be a valid UUID")]
pub struct InvalidId;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its textual form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidId> {
                let raw = id.as_ref();
                if raw.trim() != raw {
                    return Err(InvalidId);
                }
                Uuid::parse_str(raw).map(Self).map_err(|_| InvalidId)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

entity_id!(
    /// Stable user identifier.
    UserId
);
entity_id!(
    /// Stable bootcamp identifier.
    BootcampId
);
entity_id!(
    /// Stable course identifier.
    CourseId
);
entity_id!(
    /// Stable review identifier.
    ReviewId
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
    #[case("5d713995b721c3bb38c1f5d0", false)]
    #[case("", false)]
    fn parses_only_canonical_uuids(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(BootcampId::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn serialises_as_plain_string() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id");
        let value = serde_json::to_value(id).expect("serialises");
        assert_eq!(value, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }
}
