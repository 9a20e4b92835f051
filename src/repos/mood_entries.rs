use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::mood_entry::{EntryRange, MoodEntry, MoodEntryUpdate, NewMoodEntry};
use crate::validation::check;

/// Insert an entry. Fails with a foreign-key violation if `user_id` does not
/// reference an existing user.
pub async fn create(db: &PgPool, new: &NewMoodEntry) -> Result<MoodEntry, StoreError> {
    check(new)?;

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (
            id, user_id, calculated_mood_score, calculated_energy_level,
            manual_mood_score, notes, entry_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.calculated_mood_score)
    .bind(new.calculated_energy_level)
    .bind(new.manual_mood_score)
    .bind(&new.notes)
    .bind(new.entry_date)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<MoodEntry>, StoreError> {
    let entry = sqlx::query_as::<_, MoodEntry>("SELECT * FROM mood_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(entry)
}

/// Entries for one user, newest `entry_date` first.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    range: EntryRange,
) -> Result<Vec<MoodEntry>, StoreError> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR entry_date >= $2)
          AND ($3::timestamptz IS NULL OR entry_date < $3)
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    update: &MoodEntryUpdate,
) -> Result<Option<MoodEntry>, StoreError> {
    check(update)?;

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        UPDATE mood_entries SET
            calculated_mood_score = COALESCE($2, calculated_mood_score),
            calculated_energy_level = COALESCE($3, calculated_energy_level),
            manual_mood_score = COALESCE($4, manual_mood_score),
            notes = COALESCE($5, notes),
            entry_date = COALESCE($6, entry_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(update.calculated_mood_score)
    .bind(update.calculated_energy_level)
    .bind(update.manual_mood_score)
    .bind(&update.notes)
    .bind(update.entry_date)
    .fetch_optional(db)
    .await?;

    Ok(entry)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
