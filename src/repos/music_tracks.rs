use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::music_track::{MusicTrack, NewMusicTrack, TrackSearch};
use crate::validation::check;

const DEFAULT_SEARCH_LIMIT: i64 = 50;
const MAX_SEARCH_LIMIT: i64 = 200;

pub async fn create(db: &PgPool, new: &NewMusicTrack) -> Result<MusicTrack, StoreError> {
    check(new)?;

    let track = sqlx::query_as::<_, MusicTrack>(
        r#"
        INSERT INTO music_tracks (
            id, title, artist, album, genre, duration, release_year,
            spotify_id, apple_id, youtube_id, image_url, preview_url,
            tempo, valence, energy
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.title)
    .bind(&new.artist)
    .bind(&new.album)
    .bind(&new.genre)
    .bind(new.duration)
    .bind(new.release_year)
    .bind(&new.spotify_id)
    .bind(&new.apple_id)
    .bind(&new.youtube_id)
    .bind(&new.image_url)
    .bind(&new.preview_url)
    .bind(new.tempo)
    .bind(new.valence)
    .bind(new.energy)
    .fetch_one(db)
    .await?;

    Ok(track)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<MusicTrack>, StoreError> {
    let track = sqlx::query_as::<_, MusicTrack>("SELECT * FROM music_tracks WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(track)
}

/// Spotify ids are not unique in the catalog, so this can return several rows.
pub async fn find_by_spotify_id(
    db: &PgPool,
    spotify_id: &str,
) -> Result<Vec<MusicTrack>, StoreError> {
    let tracks = sqlx::query_as::<_, MusicTrack>(
        "SELECT * FROM music_tracks WHERE spotify_id = $1 ORDER BY created_at ASC",
    )
    .bind(spotify_id)
    .fetch_all(db)
    .await?;
    Ok(tracks)
}

pub async fn search(db: &PgPool, query: &TrackSearch) -> Result<Vec<MusicTrack>, StoreError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let tracks = sqlx::query_as::<_, MusicTrack>(
        r#"
        SELECT * FROM music_tracks
        WHERE ($1::text IS NULL OR title ILIKE $1)
          AND ($2::text IS NULL OR artist ILIKE $2)
        ORDER BY title ASC, artist ASC
        LIMIT $3
        "#,
    )
    .bind(query.title.as_deref().map(prefix_pattern))
    .bind(query.artist.as_deref().map(prefix_pattern))
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(tracks)
}

/// Delete a track. Listening entries that reference it go with it.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM music_tracks WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `ILIKE` prefix pattern with wildcards in the input escaped.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
