//! Mission lifecycle status.

use super::ParseMissionStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    /// Created by a manager, not yet visible to instrumentists.
    Draft,
    /// Published and waiting for an instrumentist to claim it.
    Open,
    /// Self-declared by an instrumentist after the fact.
    Declared,
    /// Claimed by an instrumentist.
    Assigned,
    /// Refused during review.
    Rejected,
    /// Encoding submitted by the instrumentist or a manager.
    Submitted,
    /// Submitted encoding accepted by a manager.
    Validated,
    /// Archived; no further changes.
    Closed,
    /// The assigned instrumentist has started the mission.
    InProgress,
}

impl MissionStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Draft,
        Self::Open,
        Self::Declared,
        Self::Assigned,
        Self::Rejected,
        Self::Submitted,
        Self::Validated,
        Self::Closed,
        Self::InProgress,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Open => "OPEN",
            Self::Declared => "DECLARED",
            Self::Assigned => "ASSIGNED",
            Self::Rejected => "REJECTED",
            Self::Submitted => "SUBMITTED",
            Self::Validated => "VALIDATED",
            Self::Closed => "CLOSED",
            Self::InProgress => "IN_PROGRESS",
        }
    }

    /// Returns whether the lifecycle permits moving from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Open)
                | (Self::Open, Self::Assigned)
                | (Self::Assigned, Self::InProgress | Self::Submitted)
                | (Self::InProgress, Self::Submitted)
                | (Self::Submitted, Self::Validated)
        )
    }

    /// Returns whether an assigned instrumentist is still working on the
    /// mission.
    #[must_use]
    pub const fn is_active_assignment(self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MissionStatus {
    type Error = ParseMissionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseMissionStatusError(value.to_owned()))
    }
}
