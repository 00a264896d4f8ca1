//! Domain model for the mission lifecycle.
//!
//! Missions move from draft through publication, claim, and submission to
//! validation. The domain owns the transition table, the encoding window,
//! publication eligibility, and the per-viewer action set, and keeps every
//! infrastructure concern outside its boundary.

mod actions;
mod actor;
mod claim;
mod eligibility;
mod encoding;
mod error;
mod ids;
mod material;
mod membership;
mod mission;
mod publication;
mod schedule;
mod status;

pub use actions::{MissionAction, allowed_actions};
pub use actor::{Actor, EmploymentType, Role};
pub use claim::MissionClaim;
pub use eligibility::PublicationPolicy;
pub use encoding::assert_encoding_allowed;
pub use error::{MissionDomainError, ParseDomainValueError, ParseMissionStatusError};
pub use ids::{ClaimId, MaterialLineId, MissionId, PublicationId, SiteId, UserId};
pub use material::{MaterialItemRequest, MaterialLine, MaterialLineChange};
pub use membership::{SiteMembership, SiteRole};
pub use mission::{Declaration, Mission, NewMission, PersistedMissionData, Submission};
pub use publication::{
    MissionPublication, PublicationAudience, PublicationChannel, PublicationScope,
};
pub use schedule::{MissionSchedule, MissionType, SchedulePrecision};
pub use status::MissionStatus;
