//! Mission claim record.

use super::{ClaimId, MissionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records which instrumentist won an open mission and when.
///
/// At most one claim exists per mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionClaim {
    /// Claim identifier.
    pub id: ClaimId,
    /// Claimed mission.
    pub mission_id: MissionId,
    /// Winning instrumentist.
    pub instrumentist_id: UserId,
    /// Time the claim was committed.
    pub claimed_at: DateTime<Utc>,
}

impl MissionClaim {
    /// Creates a claim record with a fresh identifier.
    #[must_use]
    pub fn new(mission_id: MissionId, instrumentist_id: UserId, claimed_at: DateTime<Utc>) -> Self {
        Self {
            id: ClaimId::new(),
            mission_id,
            instrumentist_id,
            claimed_at,
        }
    }
}
