//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records with lifecycle status and audit timestamps.
    tasks (task_id) {
        /// Database-assigned task identifier.
        task_id -> Int4,
        /// Caller-supplied description.
        description -> Text,
        /// Lifecycle status, stored uppercase.
        status -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Timestamp of the latest status change or description edit.
        status_changed_at -> Nullable<Timestamptz>,
    }
}
