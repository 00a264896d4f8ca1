//! Encoding window guard.
//!
//! Instrumentists may only record material usage and hours once the
//! mission's scheduled start has passed. Managers and admins may encode at
//! any time. Other roles are not restricted by this rule.

use super::{Actor, Mission, MissionDomainError};
use chrono::{DateTime, Utc};

/// Checks whether `actor` may encode content on `mission` at `now`.
///
/// The comparison uses UTC instants, so the mission's display timezone has
/// no influence. The start instant itself is inside the window.
///
/// # Errors
///
/// Returns [`MissionDomainError::EncodingBeforeStart`] when a plain
/// instrumentist encodes before the scheduled start or when the mission has
/// no start yet.
pub fn assert_encoding_allowed(
    mission: &Mission,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(), MissionDomainError> {
    if actor.is_privileged() || !actor.is_instrumentist() {
        return Ok(());
    }
    if mission.schedule().has_started(now) {
        Ok(())
    } else {
        Err(MissionDomainError::EncodingBeforeStart(mission.id()))
    }
}
