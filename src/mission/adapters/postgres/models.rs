//! Diesel row models for mission lifecycle persistence.

use super::schema::{mission_claims, mission_publications, missions, site_memberships, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for mission records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = missions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MissionRow {
    /// Mission identifier.
    pub id: uuid::Uuid,
    /// Hosting site.
    pub site_id: uuid::Uuid,
    /// Scheduled start.
    pub start_at: Option<DateTime<Utc>>,
    /// Scheduled end.
    pub end_at: Option<DateTime<Utc>>,
    /// Schedule precision.
    pub schedule_precision: String,
    /// Mission type.
    pub mission_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Operating surgeon.
    pub surgeon_id: uuid::Uuid,
    /// Assigned instrumentist.
    pub instrumentist_id: Option<uuid::Uuid>,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Self-declaration timestamp.
    pub declared_at: Option<DateTime<Utc>>,
    /// Self-declaration comment.
    pub declared_comment: Option<String>,
    /// Submission details JSON payload.
    pub submission: Option<Value>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Encoding lock timestamp.
    pub encoding_locked_at: Option<DateTime<Utc>>,
    /// Invoice generation timestamp.
    pub invoice_generated_at: Option<DateTime<Utc>>,
    /// Material lines JSON payload.
    pub material_lines: Value,
    /// Material item requests JSON payload.
    pub material_requests: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for mission records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = missions)]
#[diesel(treat_none_as_null = true)]
pub struct NewMissionRow {
    /// Mission identifier.
    pub id: uuid::Uuid,
    /// Hosting site.
    pub site_id: uuid::Uuid,
    /// Scheduled start.
    pub start_at: Option<DateTime<Utc>>,
    /// Scheduled end.
    pub end_at: Option<DateTime<Utc>>,
    /// Schedule precision.
    pub schedule_precision: String,
    /// Mission type.
    pub mission_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Operating surgeon.
    pub surgeon_id: uuid::Uuid,
    /// Assigned instrumentist.
    pub instrumentist_id: Option<uuid::Uuid>,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Self-declaration timestamp.
    pub declared_at: Option<DateTime<Utc>>,
    /// Self-declaration comment.
    pub declared_comment: Option<String>,
    /// Submission details JSON payload.
    pub submission: Option<Value>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Encoding lock timestamp.
    pub encoding_locked_at: Option<DateTime<Utc>>,
    /// Invoice generation timestamp.
    pub invoice_generated_at: Option<DateTime<Utc>>,
    /// Material lines JSON payload.
    pub material_lines: Value,
    /// Material item requests JSON payload.
    pub material_requests: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Claim record row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = mission_claims)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClaimRow {
    /// Claim identifier.
    pub id: uuid::Uuid,
    /// Claimed mission.
    pub mission_id: uuid::Uuid,
    /// Winning instrumentist.
    pub instrumentist_id: uuid::Uuid,
    /// Claim timestamp.
    pub claimed_at: DateTime<Utc>,
}

/// Publication record row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = mission_publications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PublicationRow {
    /// Publication identifier.
    pub id: uuid::Uuid,
    /// Published mission.
    pub mission_id: uuid::Uuid,
    /// Publication scope.
    pub scope: String,
    /// Targeted instrumentist.
    pub target_id: Option<uuid::Uuid>,
    /// Announcement channel.
    pub channel: String,
    /// Publishing manager.
    pub published_by: uuid::Uuid,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
}

/// Site membership row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = site_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MembershipRow {
    /// Member user.
    pub user_id: uuid::Uuid,
    /// Site.
    pub site_id: uuid::Uuid,
    /// Role at the site.
    pub site_role: String,
}

/// User directory row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Platform role.
    pub role: String,
    /// Employment arrangement.
    pub employment_type: String,
}
