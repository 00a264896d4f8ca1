//! Roles and the authenticated actor acting on missions.

use super::{ParseDomainValueError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform role held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Site or staffing manager.
    Manager,
    /// Surgeon performing missions.
    Surgeon,
    /// Instrumentist claiming and encoding missions.
    Instrumentist,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Surgeon => "surgeon",
            Self::Instrumentist => "instrumentist",
        }
    }

    /// Returns whether the role may manage any mission.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Returns whether the role is the instrumentist role.
    #[must_use]
    pub const fn is_instrumentist(self) -> bool {
        matches!(self, Self::Instrumentist)
    }

    /// Returns whether the role is the surgeon role.
    #[must_use]
    pub const fn is_surgeon(self) -> bool {
        matches!(self, Self::Surgeon)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "surgeon" => Ok(Self::Surgeon),
            "instrumentist" => Ok(Self::Instrumentist),
            _ => Err(ParseDomainValueError::new("role", value)),
        }
    }
}

/// Employment arrangement of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Employed by a hospital; pool access follows site membership.
    Employee,
    /// Independent instrumentist; sees every pool publication.
    Freelancer,
}

impl EmploymentType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Freelancer => "freelancer",
        }
    }
}

impl TryFrom<&str> for EmploymentType {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "freelancer" => Ok(Self::Freelancer),
            _ => Err(ParseDomainValueError::new("employment type", value)),
        }
    }
}

/// Authenticated caller handed over by the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    role: Role,
    employment: EmploymentType,
}

impl Actor {
    /// Creates an actor with the given role, employed by a hospital.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            employment: EmploymentType::Employee,
        }
    }

    /// Creates a freelance instrumentist actor.
    #[must_use]
    pub const fn freelancer(id: UserId) -> Self {
        Self {
            id,
            role: Role::Instrumentist,
            employment: EmploymentType::Freelancer,
        }
    }

    /// Overrides the employment arrangement.
    #[must_use]
    pub const fn with_employment(mut self, employment: EmploymentType) -> Self {
        self.employment = employment;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the platform role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the employment arrangement.
    #[must_use]
    pub const fn employment(&self) -> EmploymentType {
        self.employment
    }

    /// Returns whether the actor is a manager or admin.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Returns whether the actor is an instrumentist.
    #[must_use]
    pub const fn is_instrumentist(&self) -> bool {
        self.role.is_instrumentist()
    }

    /// Returns whether the actor is a freelance instrumentist.
    #[must_use]
    pub const fn is_freelancer(&self) -> bool {
        self.role.is_instrumentist() && matches!(self.employment, EmploymentType::Freelancer)
    }
}
