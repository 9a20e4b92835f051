use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_score;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub calculated_mood_score: Option<Decimal>,
    pub calculated_energy_level: Option<Decimal>,
    pub manual_mood_score: Option<i32>,
    pub notes: Option<String>,
    /// When the mood was felt. May be earlier than `created_at`.
    pub entry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMoodEntry {
    pub user_id: Uuid,

    #[validate(custom = "validate_score")]
    pub calculated_mood_score: Option<Decimal>,

    #[validate(custom = "validate_score")]
    pub calculated_energy_level: Option<Decimal>,

    pub manual_mood_score: Option<i32>,
    pub notes: Option<String>,
    pub entry_date: DateTime<Utc>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MoodEntryUpdate {
    #[validate(custom = "validate_score")]
    pub calculated_mood_score: Option<Decimal>,

    #[validate(custom = "validate_score")]
    pub calculated_energy_level: Option<Decimal>,

    pub manual_mood_score: Option<i32>,
    pub notes: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
}

/// Half-open `[from, to)` window over `entry_date`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EntryRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
