//! Identifier newtypes for the mission domain.
//!
//! Every entity the mission lifecycle touches is addressed by a UUID. The
//! wrappers keep mission, user, and site identifiers from being mixed up at
//! call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $label, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $label, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a mission.
    MissionId,
    "mission"
);

uuid_identifier!(
    /// Unique identifier for a platform user (surgeon, instrumentist, manager).
    UserId,
    "user"
);

uuid_identifier!(
    /// Unique identifier for a hospital site.
    SiteId,
    "site"
);

uuid_identifier!(
    /// Unique identifier for a mission claim record.
    ClaimId,
    "claim"
);

uuid_identifier!(
    /// Unique identifier for a mission publication record.
    PublicationId,
    "publication"
);

uuid_identifier!(
    /// Unique identifier for an encoded material line.
    MaterialLineId,
    "material line"
);
