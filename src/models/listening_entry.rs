use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One user listening to one catalog track.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub music_track_id: Uuid,
    pub listened_at: DateTime<Utc>,
    pub play_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewListeningEntry {
    pub user_id: Uuid,
    pub music_track_id: Uuid,
    pub listened_at: DateTime<Utc>,
    /// Defaults to 1.
    #[validate(range(min = 1))]
    pub play_count: Option<i32>,
}
