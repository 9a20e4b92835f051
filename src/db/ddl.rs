//! PostgreSQL DDL rendering for the table descriptors in [`super::schema`].

use super::schema::{Column, Table};

pub fn render_column(column: &Column) -> String {
    let mut sql = format!("{} {}", column.name, column.ty.sql());
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    } else if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default.sql());
    }
    if let Some(fk) = &column.references {
        sql.push_str(&format!(
            " REFERENCES {} ({}) ON DELETE CASCADE",
            fk.table, fk.column
        ));
    }
    sql
}

pub fn render_table(table: &Table) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("    {}", render_column(c)))
        .collect();
    format!("CREATE TABLE {} (\n{}\n);\n", table.name, columns.join(",\n"))
}

pub fn render_indexes(table: &Table) -> Vec<String> {
    table
        .indexes
        .iter()
        .map(|idx| {
            format!(
                "CREATE INDEX {} ON {} ({});",
                idx.name,
                table.name,
                idx.columns.join(", ")
            )
        })
        .collect()
}

/// Render every table, then every index. Tables must already be ordered
/// parents first.
pub fn render_schema(tables: &[Table]) -> String {
    let mut out = String::new();
    for table in tables {
        out.push_str(&render_table(table));
        out.push('\n');
    }
    for table in tables {
        for index in render_indexes(table) {
            out.push_str(&index);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{MOOD_ENTRIES, MUSIC_LISTENING_ENTRIES, MUSIC_TRACKS, SCHEMA, USERS};

    fn column_sql(table: &Table, name: &str) -> String {
        render_column(table.column(name).unwrap())
    }

    #[test]
    fn test_render_primary_key() {
        assert_eq!(
            column_sql(&USERS, "id"),
            "id UUID PRIMARY KEY DEFAULT gen_random_uuid()"
        );
    }

    #[test]
    fn test_render_unique_columns() {
        assert_eq!(column_sql(&USERS, "email"), "email VARCHAR(255) NOT NULL UNIQUE");
        assert_eq!(
            column_sql(&USERS, "username"),
            "username VARCHAR(100) NOT NULL UNIQUE"
        );
    }

    #[test]
    fn test_render_cascading_foreign_keys() {
        assert_eq!(
            column_sql(&MOOD_ENTRIES, "user_id"),
            "user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE"
        );
        assert_eq!(
            column_sql(&MUSIC_LISTENING_ENTRIES, "music_track_id"),
            "music_track_id UUID NOT NULL REFERENCES music_tracks (id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_render_numeric_columns() {
        assert_eq!(column_sql(&MUSIC_TRACKS, "tempo"), "tempo NUMERIC(6, 2)");
        assert_eq!(column_sql(&MUSIC_TRACKS, "valence"), "valence NUMERIC(3, 2)");
        assert_eq!(
            column_sql(&MUSIC_LISTENING_ENTRIES, "play_count"),
            "play_count INTEGER NOT NULL DEFAULT 1"
        );
    }

    #[test]
    fn test_render_composite_index() {
        assert_eq!(
            render_indexes(&MUSIC_TRACKS),
            vec![
                "CREATE INDEX music_tracks_title_artist_idx ON music_tracks (title, artist);",
                "CREATE INDEX music_tracks_spotify_id_idx ON music_tracks (spotify_id);",
            ]
        );
    }

    #[test]
    fn test_render_schema_creates_tables_before_indexes() {
        let sql = render_schema(SCHEMA);
        let last_table = sql.rfind("CREATE TABLE").unwrap();
        let first_index = sql.find("CREATE INDEX").unwrap();
        assert!(last_table < first_index);
        assert_eq!(sql.matches("CREATE TABLE").count(), 4);
        assert_eq!(sql.matches("CREATE INDEX").count(), 7);
        assert!(!sql.contains("UNIQUE INDEX"));
    }
}
