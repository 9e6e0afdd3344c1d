//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Lower-case, unique.
        email -> Varchar,
        /// One of `user`, `publisher`, `admin`.
        role -> Varchar,
        /// PHC-encoded PBKDF2 hash.
        password_hash -> Varchar,
        /// SHA-256 hex digest of the outstanding reset token.
        reset_token_digest -> Nullable<Varchar>,
        reset_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published bootcamps with their geocoded location.
    bootcamps (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        slug -> Text,
        description -> Text,
        website -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        /// Career display labels.
        careers -> Array<Text>,
        average_rating -> Nullable<Float8>,
        average_cost -> Nullable<Float8>,
        photo -> Varchar,
        housing -> Bool,
        job_assistance -> Bool,
        job_guarantee -> Bool,
        accept_gi -> Bool,
        latitude -> Float8,
        longitude -> Float8,
        formatted_address -> Text,
        street -> Nullable<Text>,
        city -> Nullable<Text>,
        state -> Nullable<Text>,
        zipcode -> Nullable<Text>,
        country -> Nullable<Text>,
        country_code -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        bootcamp_id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        description -> Text,
        weeks -> Int4,
        tuition -> Float8,
        minimum_skill -> Varchar,
        scholarship_available -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        bootcamp_id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        body -> Text,
        rating -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(courses -> bootcamps (bootcamp_id));
diesel::joinable!(reviews -> bootcamps (bootcamp_id));

diesel::allow_tables_to_appear_in_same_query!(users, bootcamps, courses, reviews);
