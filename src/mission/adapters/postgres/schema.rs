//! Diesel schema for mission lifecycle persistence.

diesel::table! {
    /// Mission records.
    missions (id) {
        /// Mission identifier.
        id -> Uuid,
        /// Hosting site.
        site_id -> Uuid,
        /// Scheduled start.
        start_at -> Nullable<Timestamptz>,
        /// Scheduled end.
        end_at -> Nullable<Timestamptz>,
        /// Schedule precision.
        #[max_length = 20]
        schedule_precision -> Varchar,
        /// Mission type.
        #[max_length = 20]
        mission_type -> Varchar,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Operating surgeon.
        surgeon_id -> Uuid,
        /// Assigned instrumentist.
        instrumentist_id -> Nullable<Uuid>,
        /// Creator.
        created_by -> Uuid,
        /// Self-declaration timestamp.
        declared_at -> Nullable<Timestamptz>,
        /// Self-declaration comment.
        declared_comment -> Nullable<Text>,
        /// Submission details.
        submission -> Nullable<Jsonb>,
        /// Submission timestamp.
        submitted_at -> Nullable<Timestamptz>,
        /// Encoding lock timestamp.
        encoding_locked_at -> Nullable<Timestamptz>,
        /// Invoice generation timestamp.
        invoice_generated_at -> Nullable<Timestamptz>,
        /// Encoded material lines.
        material_lines -> Jsonb,
        /// Material item requests.
        material_requests -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Claim records, at most one per mission.
    mission_claims (id) {
        /// Claim identifier.
        id -> Uuid,
        /// Claimed mission.
        mission_id -> Uuid,
        /// Winning instrumentist.
        instrumentist_id -> Uuid,
        /// Claim timestamp.
        claimed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Publication events.
    mission_publications (id) {
        /// Publication identifier.
        id -> Uuid,
        /// Published mission.
        mission_id -> Uuid,
        /// Publication scope.
        #[max_length = 20]
        scope -> Varchar,
        /// Targeted instrumentist.
        target_id -> Nullable<Uuid>,
        /// Announcement channel.
        #[max_length = 20]
        channel -> Varchar,
        /// Publishing manager.
        published_by -> Uuid,
        /// Publication timestamp.
        published_at -> Timestamptz,
    }
}

diesel::table! {
    /// Site memberships.
    site_memberships (user_id, site_id) {
        /// Member user.
        user_id -> Uuid,
        /// Site.
        site_id -> Uuid,
        /// Role at the site.
        #[max_length = 20]
        site_role -> Varchar,
    }
}

diesel::table! {
    /// Platform users referenced by missions.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Platform role.
        #[max_length = 20]
        role -> Varchar,
        /// Employment arrangement.
        #[max_length = 20]
        employment_type -> Varchar,
    }
}
