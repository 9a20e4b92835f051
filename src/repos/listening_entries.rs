use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::listening_entry::{ListeningEntry, NewListeningEntry};
use crate::validation::check;

/// Record a listen. Both the user and the track must exist.
pub async fn record(db: &PgPool, new: &NewListeningEntry) -> Result<ListeningEntry, StoreError> {
    check(new)?;

    let entry = sqlx::query_as::<_, ListeningEntry>(
        r#"
        INSERT INTO music_listening_entries (id, user_id, music_track_id, listened_at, play_count)
        VALUES ($1, $2, $3, $4, COALESCE($5, 1))
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.music_track_id)
    .bind(new.listened_at)
    .bind(new.play_count)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<ListeningEntry>, StoreError> {
    let entries = sqlx::query_as::<_, ListeningEntry>(
        r#"
        SELECT * FROM music_listening_entries
        WHERE user_id = $1
        ORDER BY listened_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(entries)
}

pub async fn list_for_track(
    db: &PgPool,
    music_track_id: Uuid,
) -> Result<Vec<ListeningEntry>, StoreError> {
    let entries = sqlx::query_as::<_, ListeningEntry>(
        r#"
        SELECT * FROM music_listening_entries
        WHERE music_track_id = $1
        ORDER BY listened_at DESC
        "#,
    )
    .bind(music_track_id)
    .fetch_all(db)
    .await?;
    Ok(entries)
}

/// Bump the play counter of an existing entry.
pub async fn increment_play_count(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<ListeningEntry>, StoreError> {
    let entry = sqlx::query_as::<_, ListeningEntry>(
        r#"
        UPDATE music_listening_entries
        SET play_count = play_count + 1
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(entry)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM music_listening_entries WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
