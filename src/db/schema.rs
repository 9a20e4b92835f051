//! Table definitions for the Mood Vault store.
//!
//! Every table is a `const` descriptor. [`crate::db::ddl`] renders them to
//! PostgreSQL DDL for the migration tool, and the insert DTOs in
//! [`crate::models`] validate against the same bounds before a row reaches
//! the database.
//!
//! Rules carried by the descriptors:
//! - `users.email` and `users.username` are the only unique columns.
//! - Every foreign key deletes in cascade with its parent row.
//! - Indexes are for read paths only and never unique.
//! - `created_at` / `updated_at` default to `NOW()` on insert.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed-point NUMERIC(precision, scale) column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub precision: u32,
    pub scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value} does not fit NUMERIC({}, {})", .spec.precision, .spec.scale)]
pub struct DecimalOutOfRange {
    pub value: Decimal,
    pub spec: DecimalSpec,
}

impl DecimalSpec {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Largest magnitude the column can hold, e.g. `9.99` for NUMERIC(3, 2).
    pub fn max_abs(&self) -> Decimal {
        Decimal::new(10i64.pow(self.precision) - 1, self.scale)
    }

    /// Round to the column scale the way PostgreSQL does on insert, then
    /// reject anything that overflows the integer digits.
    pub fn fit(&self, value: Decimal) -> Result<Decimal, DecimalOutOfRange> {
        let rounded = value.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero);
        if rounded.abs() > self.max_abs() {
            return Err(DecimalOutOfRange { value, spec: *self });
        }
        Ok(rounded)
    }
}

/// Mood score, energy level, valence and energy audio features.
pub const SCORE: DecimalSpec = DecimalSpec::new(3, 2);
/// Track tempo in BPM.
pub const TEMPO: DecimalSpec = DecimalSpec::new(6, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Varchar(u32),
    Text,
    Integer,
    Numeric(DecimalSpec),
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Uuid => "UUID".into(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Numeric(spec) => format!("NUMERIC({}, {})", spec.precision, spec.scale),
            ColumnType::Timestamp => "TIMESTAMPTZ".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    RandomUuid,
    Now,
    Integer(i64),
}

impl ColumnDefault {
    pub fn sql(&self) -> String {
        match self {
            ColumnDefault::RandomUuid => "gen_random_uuid()".into(),
            ColumnDefault::Now => "NOW()".into(),
            ColumnDefault::Integer(value) => value.to_string(),
        }
    }
}

/// Foreign key to `table(column)`. Always `ON DELETE CASCADE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    pub references: Option<ForeignKey>,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            not_null: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default(self, default: ColumnDefault) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn references(self, table: &'static str, column: &'static str) -> Self {
        Self {
            references: Some(ForeignKey { table, column }),
            ..self
        }
    }

    /// Maximum character length for VARCHAR columns.
    pub fn max_len(&self) -> Option<u32> {
        match self.ty {
            ColumnType::Varchar(len) => Some(len),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indexes: &'static [Index],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Column, &ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref().map(|fk| (c, fk)))
    }
}

const fn id() -> Column {
    Column::new("id", ColumnType::Uuid)
        .primary_key()
        .default(ColumnDefault::RandomUuid)
}

const fn timestamp_now(name: &'static str) -> Column {
    Column::new(name, ColumnType::Timestamp)
        .not_null()
        .default(ColumnDefault::Now)
}

pub const USERS: Table = Table {
    name: "users",
    columns: &[
        id(),
        Column::new("email", ColumnType::Varchar(255)).not_null().unique(),
        Column::new("username", ColumnType::Varchar(100)).not_null().unique(),
        Column::new("password_hash", ColumnType::Varchar(255)).not_null(),
        Column::new("current_mood", ColumnType::Varchar(50)),
        Column::new("mood_score", ColumnType::Numeric(SCORE)),
        Column::new("energy_level", ColumnType::Numeric(SCORE)),
        Column::new("last_mood_update", ColumnType::Timestamp),
        timestamp_now("created_at"),
        timestamp_now("updated_at"),
    ],
    indexes: &[],
};

pub const MOOD_ENTRIES: Table = Table {
    name: "mood_entries",
    columns: &[
        id(),
        Column::new("user_id", ColumnType::Uuid)
            .not_null()
            .references("users", "id"),
        Column::new("calculated_mood_score", ColumnType::Numeric(SCORE)),
        Column::new("calculated_energy_level", ColumnType::Numeric(SCORE)),
        Column::new("manual_mood_score", ColumnType::Integer),
        Column::new("notes", ColumnType::Text),
        Column::new("entry_date", ColumnType::Timestamp).not_null(),
        timestamp_now("created_at"),
        timestamp_now("updated_at"),
    ],
    indexes: &[
        Index {
            name: "mood_entries_user_id_idx",
            columns: &["user_id"],
        },
        Index {
            name: "mood_entries_entry_date_idx",
            columns: &["entry_date"],
        },
    ],
};

// spotify/apple/youtube ids are indexed but deliberately not unique: the
// catalog tolerates duplicate imports of the same external track.
pub const MUSIC_TRACKS: Table = Table {
    name: "music_tracks",
    columns: &[
        id(),
        Column::new("title", ColumnType::Varchar(255)).not_null(),
        Column::new("artist", ColumnType::Varchar(255)).not_null(),
        Column::new("album", ColumnType::Varchar(255)),
        Column::new("genre", ColumnType::Varchar(100)),
        Column::new("duration", ColumnType::Integer),
        Column::new("release_year", ColumnType::Integer),
        Column::new("spotify_id", ColumnType::Varchar(100)),
        Column::new("apple_id", ColumnType::Varchar(100)),
        Column::new("youtube_id", ColumnType::Varchar(100)),
        Column::new("image_url", ColumnType::Varchar(500)),
        Column::new("preview_url", ColumnType::Varchar(500)),
        Column::new("tempo", ColumnType::Numeric(TEMPO)),
        Column::new("valence", ColumnType::Numeric(SCORE)),
        Column::new("energy", ColumnType::Numeric(SCORE)),
        timestamp_now("created_at"),
        timestamp_now("updated_at"),
    ],
    indexes: &[
        Index {
            name: "music_tracks_title_artist_idx",
            columns: &["title", "artist"],
        },
        Index {
            name: "music_tracks_spotify_id_idx",
            columns: &["spotify_id"],
        },
    ],
};

pub const MUSIC_LISTENING_ENTRIES: Table = Table {
    name: "music_listening_entries",
    columns: &[
        id(),
        Column::new("user_id", ColumnType::Uuid)
            .not_null()
            .references("users", "id"),
        Column::new("music_track_id", ColumnType::Uuid)
            .not_null()
            .references("music_tracks", "id"),
        Column::new("listened_at", ColumnType::Timestamp).not_null(),
        Column::new("play_count", ColumnType::Integer)
            .not_null()
            .default(ColumnDefault::Integer(1)),
        timestamp_now("created_at"),
    ],
    indexes: &[
        Index {
            name: "music_listening_entries_user_id_idx",
            columns: &["user_id"],
        },
        Index {
            name: "music_listening_entries_music_track_idx",
            columns: &["music_track_id"],
        },
        Index {
            name: "music_listening_entries_listened_at_idx",
            columns: &["listened_at"],
        },
    ],
};

/// All tables, parents before children.
pub const SCHEMA: &[Table] = &[USERS, MOOD_ENTRIES, MUSIC_TRACKS, MUSIC_LISTENING_ENTRIES];
