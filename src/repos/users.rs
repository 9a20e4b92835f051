use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::user::{MoodUpdate, NewUser, User};
use crate::validation::check;

pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, StoreError> {
    check(new)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, username, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.email)
    .bind(&new.username)
    .bind(&new.password_hash)
    .fetch_one(db)
    .await?;

    tracing::debug!(user_id = %user.id, "User created");
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Replace the user's mood snapshot. Stamps `last_mood_update` and
/// `updated_at`. Returns `None` if the user does not exist.
pub async fn update_mood(
    db: &PgPool,
    id: Uuid,
    update: &MoodUpdate,
) -> Result<Option<User>, StoreError> {
    check(update)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            current_mood = $2,
            mood_score = $3,
            energy_level = $4,
            last_mood_update = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.current_mood)
    .bind(update.mood_score)
    .bind(update.energy_level)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

/// Delete a user. Mood entries and listening entries go with it.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(user_id = %id, "User deleted");
    }
    Ok(result.rows_affected() > 0)
}
