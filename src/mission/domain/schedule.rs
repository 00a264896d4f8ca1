//! Mission scheduling types.

use super::{MissionDomainError, ParseDomainValueError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How precisely the mission time slot is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulePrecision {
    /// Start and end are firm.
    Exact,
    /// Start and end are indicative.
    Approximate,
}

impl SchedulePrecision {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Approximate => "APPROXIMATE",
        }
    }
}

impl TryFrom<&str> for SchedulePrecision {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EXACT" => Ok(Self::Exact),
            "APPROXIMATE" => Ok(Self::Approximate),
            _ => Err(ParseDomainValueError::new("schedule precision", value)),
        }
    }
}

/// Kind of staffing assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionType {
    /// Operating-room block.
    Block,
    /// Consultation session.
    Consultation,
}

impl MissionType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "BLOCK",
            Self::Consultation => "CONSULTATION",
        }
    }
}

impl TryFrom<&str> for MissionType {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BLOCK" => Ok(Self::Block),
            "CONSULTATION" => Ok(Self::Consultation),
            _ => Err(ParseDomainValueError::new("mission type", value)),
        }
    }
}

/// Scheduled time slot of a mission.
///
/// Both bounds stay optional until the mission is planned. When both are
/// known the end must come strictly after the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSchedule {
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
    precision: SchedulePrecision,
}

impl MissionSchedule {
    /// Creates a validated schedule with exact precision.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::InvalidSchedule`] when both bounds are
    /// present and `end_at <= start_at`.
    pub fn new(
        start_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
    ) -> Result<Self, MissionDomainError> {
        if let (Some(start), Some(end)) = (start_at, end_at)
            && end <= start
        {
            return Err(MissionDomainError::InvalidSchedule {
                start_at: start,
                end_at: end,
            });
        }
        Ok(Self {
            start_at,
            end_at,
            precision: SchedulePrecision::Exact,
        })
    }

    /// Creates a schedule whose bounds are not known yet.
    #[must_use]
    pub const fn unscheduled() -> Self {
        Self {
            start_at: None,
            end_at: None,
            precision: SchedulePrecision::Exact,
        }
    }

    /// Sets the schedule precision.
    #[must_use]
    pub const fn with_precision(mut self, precision: SchedulePrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Returns the scheduled start, if any.
    #[must_use]
    pub const fn start_at(&self) -> Option<DateTime<Utc>> {
        self.start_at
    }

    /// Returns the scheduled end, if any.
    #[must_use]
    pub const fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    /// Returns the schedule precision.
    #[must_use]
    pub const fn precision(&self) -> SchedulePrecision {
        self.precision
    }

    /// Returns whether the scheduled start has been reached at `now`.
    ///
    /// An unscheduled mission has never started.
    #[must_use]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_at.is_some_and(|start| now >= start)
    }
}

impl Default for MissionSchedule {
    fn default() -> Self {
        Self::unscheduled()
    }
}
