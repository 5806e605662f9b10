//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. `diesel print-schema` regenerates them from a live database.

diesel::table! {
    /// User accounts.
    ///
    /// `username` carries the `users_username_key` unique constraint.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Login name (max 150 characters).
        username -> Varchar,
        /// Encoded password hash.
        credential_hash -> Text,
        /// Whether the account may view rosters.
        is_admin -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Capacity-limited events.
    ///
    /// `name` is unique and `capacity` is constrained to be positive.
    events (id) {
        id -> Int8,
        name -> Varchar,
        capacity -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per enrolled `(user_id, event_id)` pair.
    ///
    /// The `registrations_user_event_key` unique constraint is the durable
    /// guard against duplicate enrollment. Both foreign keys cascade on
    /// delete.
    registrations (id) {
        id -> Int8,
        user_id -> Int8,
        event_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(registrations -> users (user_id));
diesel::joinable!(registrations -> events (event_id));

diesel::allow_tables_to_appear_in_same_query!(events, registrations, users);
