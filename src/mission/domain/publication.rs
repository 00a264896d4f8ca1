//! Mission publication records.

use super::{MissionDomainError, MissionId, ParseDomainValueError, PublicationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience a publication is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationScope {
    /// Every eligible instrumentist.
    Pool,
    /// A single named instrumentist.
    Targeted,
}

impl PublicationScope {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pool => "POOL",
            Self::Targeted => "TARGETED",
        }
    }
}

impl TryFrom<&str> for PublicationScope {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "POOL" => Ok(Self::Pool),
            "TARGETED" => Ok(Self::Targeted),
            _ => Err(ParseDomainValueError::new("publication scope", value)),
        }
    }
}

/// Channel through which a publication was announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationChannel {
    /// Listed in the application offers feed.
    InApp,
    /// Also announced by e-mail.
    Email,
}

impl PublicationChannel {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InApp => "IN_APP",
            Self::Email => "EMAIL",
        }
    }
}

impl TryFrom<&str> for PublicationChannel {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN_APP" => Ok(Self::InApp),
            "EMAIL" => Ok(Self::Email),
            _ => Err(ParseDomainValueError::new("publication channel", value)),
        }
    }
}

/// Validated publication audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationAudience {
    /// Offered to the eligible pool.
    Pool,
    /// Offered to one instrumentist only.
    Targeted(UserId),
}

impl PublicationAudience {
    /// Builds an audience from a scope and an optional target.
    ///
    /// A target supplied alongside a pool scope is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::MissingPublicationTarget`] for a
    /// targeted scope without a target.
    pub fn from_scope(
        scope: PublicationScope,
        target: Option<UserId>,
    ) -> Result<Self, MissionDomainError> {
        match (scope, target) {
            (PublicationScope::Pool, _) => Ok(Self::Pool),
            (PublicationScope::Targeted, Some(user_id)) => Ok(Self::Targeted(user_id)),
            (PublicationScope::Targeted, None) => Err(MissionDomainError::MissingPublicationTarget),
        }
    }

    /// Returns the scope of this audience.
    #[must_use]
    pub const fn scope(self) -> PublicationScope {
        match self {
            Self::Pool => PublicationScope::Pool,
            Self::Targeted(_) => PublicationScope::Targeted,
        }
    }

    /// Returns the targeted instrumentist, if any.
    #[must_use]
    pub const fn target(self) -> Option<UserId> {
        match self {
            Self::Pool => None,
            Self::Targeted(user_id) => Some(user_id),
        }
    }
}

/// One publication event of a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionPublication {
    /// Publication identifier.
    pub id: PublicationId,
    /// Published mission.
    pub mission_id: MissionId,
    /// Audience of the publication.
    pub audience: PublicationAudience,
    /// Announcement channel.
    pub channel: PublicationChannel,
    /// Manager who published the mission.
    pub published_by: UserId,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
}

impl MissionPublication {
    /// Returns the publication scope.
    #[must_use]
    pub const fn scope(&self) -> PublicationScope {
        self.audience.scope()
    }

    /// Returns whether this publication names `user_id` as its target.
    #[must_use]
    pub fn targets(&self, user_id: UserId) -> bool {
        self.audience.target() == Some(user_id)
    }
}
