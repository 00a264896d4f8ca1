//! Actions a viewer may perform on a mission.

use super::{Actor, Mission, MissionStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Action token exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionAction {
    /// Read the mission.
    View,
    /// Edit mission details.
    Edit,
    /// Publish a draft.
    Publish,
    /// List publication events.
    ViewPublications,
    /// Cancel the mission.
    Cancel,
    /// Assign another instrumentist.
    Reassign,
    /// Inspect the winning claim.
    ViewClaim,
    /// Accept submitted encoding.
    Validate,
    /// Send submitted encoding back.
    Reopen,
    /// Claim an open mission.
    Claim,
    /// Encode material and hours.
    EditEncoding,
    /// Submit encoding.
    Submit,
    /// Rate the instrumentist.
    RateInstrumentist,
    /// Dispute declared hours.
    DisputeHours,
}

impl MissionAction {
    /// Returns the client-facing token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Publish => "publish",
            Self::ViewPublications => "view_publications",
            Self::Cancel => "cancel",
            Self::Reassign => "reassign",
            Self::ViewClaim => "view_claim",
            Self::Validate => "validate",
            Self::Reopen => "reopen",
            Self::Claim => "claim",
            Self::EditEncoding => "edit_encoding",
            Self::Submit => "submit",
            Self::RateInstrumentist => "rate_instrumentist",
            Self::DisputeHours => "dispute_hours",
        }
    }
}

impl fmt::Display for MissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the action set for `viewer` on `mission`.
///
/// The result depends only on the mission status, the viewer role, and
/// whether the viewer is the mission's surgeon or assigned instrumentist.
#[must_use]
pub fn allowed_actions(mission: &Mission, viewer: &Actor) -> BTreeSet<MissionAction> {
    let mut actions = BTreeSet::from([MissionAction::View]);
    let status = mission.status();

    if viewer.is_privileged() {
        actions.extend(privileged_actions(status));
    }

    if viewer.is_instrumentist() {
        if status == MissionStatus::Open {
            actions.insert(MissionAction::Claim);
        }
        if mission.instrumentist_id() == Some(viewer.id()) && status.is_active_assignment() {
            actions.extend([MissionAction::EditEncoding, MissionAction::Submit]);
        }
    }

    if mission.surgeon_id() == viewer.id() {
        actions.extend([MissionAction::RateInstrumentist, MissionAction::DisputeHours]);
    }

    actions
}

const fn privileged_actions(status: MissionStatus) -> &'static [MissionAction] {
    match status {
        MissionStatus::Draft => &[MissionAction::Edit, MissionAction::Publish],
        MissionStatus::Open => &[MissionAction::ViewPublications, MissionAction::Cancel],
        MissionStatus::Assigned => &[
            MissionAction::Cancel,
            MissionAction::Reassign,
            MissionAction::ViewClaim,
        ],
        MissionStatus::Submitted => &[MissionAction::Validate, MissionAction::Reopen],
        MissionStatus::Declared
        | MissionStatus::Rejected
        | MissionStatus::Validated
        | MissionStatus::Closed
        | MissionStatus::InProgress => &[],
    }
}
