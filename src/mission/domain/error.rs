//! Error types for mission domain validation, transitions, and parsing.

use super::{MaterialLineId, MissionId, MissionStatus, UserId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by mission aggregate rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionDomainError {
    /// The requested lifecycle transition is not permitted from the current
    /// status.
    #[error("mission {mission_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Mission being transitioned.
        mission_id: MissionId,
        /// Current status.
        from: MissionStatus,
        /// Requested status.
        to: MissionStatus,
    },

    /// An instrumentist is already assigned to the mission.
    #[error("mission {0} already has an assigned instrumentist")]
    AlreadyAssigned(MissionId),

    /// An instrumentist tried to encode content before the mission started.
    #[error("encoding not allowed before mission start (mission {0})")]
    EncodingBeforeStart(MissionId),

    /// The mission was submitted and its encoding is locked for
    /// instrumentists.
    #[error("encoding is locked for mission {0}")]
    EncodingLocked(MissionId),

    /// Mission content cannot be encoded in the current status.
    #[error("mission {mission_id} does not accept encoding while {status}")]
    NotEncodable {
        /// Mission being encoded.
        mission_id: MissionId,
        /// Current status.
        status: MissionStatus,
    },

    /// The actor is not the instrumentist assigned to the mission.
    #[error("user {user_id} is not the instrumentist assigned to mission {mission_id}")]
    NotAssignedInstrumentist {
        /// Mission being acted upon.
        mission_id: MissionId,
        /// Offending actor.
        user_id: UserId,
    },

    /// The actor does not hold a manager or admin role.
    #[error("user {0} does not hold a manager or admin role")]
    NotPrivileged(UserId),

    /// The actor does not hold the instrumentist role.
    #[error("user {0} is not an instrumentist")]
    NotInstrumentist(UserId),

    /// The scheduled end does not come strictly after the start.
    #[error("mission end {end_at} must be after start {start_at}")]
    InvalidSchedule {
        /// Scheduled start.
        start_at: DateTime<Utc>,
        /// Scheduled end.
        end_at: DateTime<Utc>,
    },

    /// A targeted publication was requested without a target instrumentist.
    #[error("targeted publication requires a target instrumentist")]
    MissingPublicationTarget,

    /// A material line quantity must be positive.
    #[error("material quantity must be positive, got {0}")]
    InvalidQuantity(u32),

    /// A material item label is empty after trimming.
    #[error("material item must not be empty")]
    EmptyMaterialItem,

    /// The material line does not exist on the mission.
    #[error("material line {line_id} not found on mission {mission_id}")]
    MaterialLineNotFound {
        /// Mission being encoded.
        mission_id: MissionId,
        /// Missing line.
        line_id: MaterialLineId,
    },
}

/// Error returned while parsing mission statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mission status: {0}")]
pub struct ParseMissionStatusError(pub String);

/// Error returned while parsing other stored mission enumerations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} value: {value}")]
pub struct ParseDomainValueError {
    /// Name of the enumeration being parsed.
    pub field: &'static str,
    /// Raw stored value.
    pub value: String,
}

impl ParseDomainValueError {
    /// Creates a parse error for the named field.
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
