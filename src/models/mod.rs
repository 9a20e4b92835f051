pub mod listening_entry;
pub mod mood_entry;
pub mod music_track;
pub mod user;
