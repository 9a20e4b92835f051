//! Schema-to-SQL migration tooling.
//!
//! [`MigrationConfig`] names where the schema lives, where versioned SQL
//! files go, which dialect to render and which environment variable holds
//! the connection string. The running service never reads it; only the
//! `moodvault-migrate` binary does.

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::{ddl, schema};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("{0} must be set")]
    MissingEnv(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid migration name: {0:?}")]
    InvalidName(String),

    #[error(
        "{} already holds {count} migration(s); the generated script is a full baseline",
        .dir.display()
    )]
    ExistingMigrations { dir: PathBuf, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to connect: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgresql,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgresql => write!(f, "postgresql"),
        }
    }
}

impl FromStr for Dialect {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            other => Err(MigrationError::UnsupportedDialect(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Source file of the table definitions.
    pub schema: PathBuf,
    /// Directory holding versioned `.sql` migrations.
    pub out: PathBuf,
    pub dialect: Dialect,
    /// Environment variable that carries the database URL.
    pub credentials_env: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("src/db/schema.rs"),
            out: PathBuf::from("migrations"),
            dialect: Dialect::Postgresql,
            credentials_env: "DATABASE_URL".into(),
        }
    }
}

impl MigrationConfig {
    pub fn from_env() -> Result<Self, MigrationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MigrationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup("MIGRATIONS_DIR").filter(|d| !d.is_empty()) {
            config.out = PathBuf::from(dir);
        }
        if let Some(dialect) = lookup("DB_DIALECT") {
            config.dialect = dialect.parse()?;
        }
        Ok(config)
    }

    /// Resolve the connection string. Fails if the variable is unset.
    pub fn database_url_from<F>(&self, lookup: F) -> Result<String, MigrationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.credentials_env)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| MigrationError::MissingEnv(self.credentials_env.clone()))
    }

    pub fn database_url(&self) -> Result<String, MigrationError> {
        self.database_url_from(|name| std::env::var(name).ok())
    }
}

/// Full migration script for the current schema.
pub fn render_migration(config: &MigrationConfig) -> String {
    let body = match config.dialect {
        Dialect::Postgresql => ddl::render_schema(schema::SCHEMA),
    };
    format!(
        "-- Generated by moodvault-migrate from {}\n-- Dialect: {}\n\n{}",
        config.schema.display(),
        config.dialect,
        body
    )
}

/// `<UTC timestamp>_<slug>.sql`, the layout `sqlx::migrate!` expects.
pub fn migration_file_name(name: &str, now: DateTime<Utc>) -> Result<String, MigrationError> {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        return Err(MigrationError::InvalidName(name.to_string()));
    }
    Ok(format!("{}_{}.sql", now.format("%Y%m%d%H%M%S"), slug))
}

/// `.sql` files directly inside `dir`, sorted. A missing directory has none.
pub fn existing_migrations(dir: &Path) -> Result<Vec<PathBuf>, MigrationError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Write the schema as a new versioned migration into `config.out`.
///
/// The script creates every table, so it is only valid as the first
/// migration. If `config.out` already holds migrations this fails unless
/// `force` is set, in which case the existing `.sql` files are removed and
/// the new script replaces them as the baseline.
pub fn generate(
    config: &MigrationConfig,
    name: &str,
    now: DateTime<Utc>,
    force: bool,
) -> Result<PathBuf, MigrationError> {
    let file_name = migration_file_name(name, now)?;

    let existing = existing_migrations(&config.out)?;
    if !existing.is_empty() {
        if !force {
            return Err(MigrationError::ExistingMigrations {
                dir: config.out.clone(),
                count: existing.len(),
            });
        }
        for old in &existing {
            std::fs::remove_file(old)?;
            tracing::warn!(path = %old.display(), "Removed migration replaced by new baseline");
        }
    }

    let path = config.out.join(file_name);
    std::fs::create_dir_all(&config.out)?;
    std::fs::write(&path, render_migration(config))?;
    tracing::info!(path = %path.display(), "Migration generated");
    Ok(path)
}

/// Apply every pending migration in `config.out`. Returns how many
/// migrations the directory holds.
pub async fn apply(config: &MigrationConfig) -> Result<usize, MigrationError> {
    let url = config.database_url()?;
    let migrator = Migrator::new(Path::new(&config.out)).await?;
    let pool = PgPoolOptions::new().max_connections(1).connect(&url).await?;

    migrator.run(&pool).await?;
    pool.close().await;

    let count = migrator.iter().count();
    tracing::info!(dir = %config.out.display(), count, "Migrations applied");
    Ok(count)
}
