//! Site memberships used for pool eligibility.

use super::{ParseDomainValueError, SiteId, UserId};
use serde::{Deserialize, Serialize};

/// Role a user holds at a particular site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRole {
    /// Manages staffing for the site.
    Manager,
    /// Instrumentist attached to the site.
    Instrumentist,
    /// Surgeon operating at the site.
    Surgeon,
}

impl SiteRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Instrumentist => "instrumentist",
            Self::Surgeon => "surgeon",
        }
    }
}

impl TryFrom<&str> for SiteRole {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "instrumentist" => Ok(Self::Instrumentist),
            "surgeon" => Ok(Self::Surgeon),
            _ => Err(ParseDomainValueError::new("site role", value)),
        }
    }
}

/// Association between a user and a hospital site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteMembership {
    /// Member user.
    pub user_id: UserId,
    /// Site the user belongs to.
    pub site_id: SiteId,
    /// Role held at the site.
    pub site_role: SiteRole,
}

impl SiteMembership {
    /// Creates a membership record.
    #[must_use]
    pub const fn new(user_id: UserId, site_id: SiteId, site_role: SiteRole) -> Self {
        Self {
            user_id,
            site_id,
            site_role,
        }
    }
}
