use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_score;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub current_mood: Option<String>,
    pub mood_score: Option<Decimal>,
    pub energy_level: Option<Decimal>,
    pub last_mood_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert. The password must already be hashed.
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 255))]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub username: String,

    #[validate(length(min = 1, max = 255))]
    pub password_hash: String,
}

/// Snapshot of the user's latest mood. Fields left as `None` are cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MoodUpdate {
    #[validate(length(max = 50))]
    pub current_mood: Option<String>,

    #[validate(custom = "validate_score")]
    pub mood_score: Option<Decimal>,

    #[validate(custom = "validate_score")]
    pub energy_level: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;
    use rust_decimal_macros::dec;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            username: "ana".into(),
            password_hash: "$argon2id$v=19$...".into(),
            current_mood: Some("calm".into()),
            mood_score: Some(dec!(7.25)),
            energy_level: None,
            last_mood_update: Some(now),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["mood_score"], "7.25");
        assert_eq!(json["username"], "ana");
    }

    #[test]
    fn test_new_user_lengths() {
        let ok = NewUser {
            email: "a".repeat(255),
            username: "u".repeat(100),
            password_hash: "h".into(),
        };
        assert!(check(&ok).is_ok());

        let too_long = NewUser {
            username: "u".repeat(101),
            ..ok
        };
        assert_eq!(check(&too_long).unwrap_err().fields(), vec!["username"]);
    }

    #[test]
    fn test_mood_update_rejects_out_of_range_scores() {
        let update = MoodUpdate {
            current_mood: Some("wired".into()),
            mood_score: Some(dec!(12.5)),
            energy_level: Some(dec!(-10)),
        };
        let err = check(&update).unwrap_err();
        assert_eq!(err.fields(), vec!["energy_level", "mood_score"]);
        assert!(err.errors.iter().all(|e| e.code == "decimal_range"));
    }
}
