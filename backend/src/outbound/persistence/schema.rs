//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The unique
//! `lower(email)` index and the self-follow CHECK are not expressible here;
//! adapters recognise them by constraint name when they fire.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Trimmed display name, at most 50 characters.
        name -> Varchar,
        /// Lowercase canonical email.
        email -> Varchar,
        /// PHC-encoded digest; null until a password is set.
        password_digest -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Short posts owned by a user.
    microposts (id) {
        id -> Uuid,
        author_id -> Uuid,
        content -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges keyed by (follower, followed).
    relationships (follower_id, followed_id) {
        follower_id -> Uuid,
        followed_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(microposts -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(microposts, relationships, users);
