use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_score, validate_tempo};

/// Catalog entry. Not owned by any user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MusicTrack {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Seconds.
    pub duration: Option<i32>,
    pub release_year: Option<i32>,
    pub spotify_id: Option<String>,
    pub apple_id: Option<String>,
    pub youtube_id: Option<String>,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub tempo: Option<Decimal>,
    pub valence: Option<Decimal>,
    pub energy: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewMusicTrack {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub artist: String,
    #[validate(length(max = 255))]
    pub album: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub release_year: Option<i32>,
    #[validate(length(max = 100))]
    pub spotify_id: Option<String>,
    #[validate(length(max = 100))]
    pub apple_id: Option<String>,
    #[validate(length(max = 100))]
    pub youtube_id: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[validate(length(max = 500))]
    pub preview_url: Option<String>,
    #[validate(custom = "validate_tempo")]
    pub tempo: Option<Decimal>,
    #[validate(custom = "validate_score")]
    pub valence: Option<Decimal>,
    #[validate(custom = "validate_score")]
    pub energy: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackSearch {
    /// Case-insensitive title prefix.
    pub title: Option<String>,
    /// Case-insensitive artist prefix.
    pub artist: Option<String>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;
    use rust_decimal_macros::dec;

    fn track() -> NewMusicTrack {
        NewMusicTrack {
            title: "Teardrop".into(),
            artist: "Massive Attack".into(),
            tempo: Some(dec!(77.00)),
            valence: Some(dec!(0.25)),
            energy: Some(dec!(0.41)),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_track() {
        assert!(check(&track()).is_ok());
    }

    #[test]
    fn test_audio_features_are_range_checked() {
        let bad = NewMusicTrack {
            tempo: Some(dec!(10000.00)),
            valence: Some(dec!(10)),
            ..track()
        };
        assert_eq!(check(&bad).unwrap_err().fields(), vec!["tempo", "valence"]);
    }

    #[test]
    fn test_title_and_artist_are_required() {
        let bad = NewMusicTrack {
            title: String::new(),
            artist: String::new(),
            ..track()
        };
        assert_eq!(check(&bad).unwrap_err().fields(), vec!["artist", "title"]);
    }

    #[test]
    fn test_url_length() {
        let bad = NewMusicTrack {
            preview_url: Some(format!("https://cdn.example.com/{}", "p".repeat(500))),
            ..track()
        };
        assert_eq!(check(&bad).unwrap_err().fields(), vec!["preview_url"]);
    }
}
