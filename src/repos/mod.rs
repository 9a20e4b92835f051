//! Data access for the four Mood Vault tables.
//!
//! Each insert DTO is validated before it reaches PostgreSQL, and every
//! storage error is classified into [`crate::db::StoreError`].

pub mod listening_entries;
pub mod mood_entries;
pub mod music_tracks;
pub mod users;
