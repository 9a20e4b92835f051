use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use moodvault_api::migrate::{self, MigrationConfig};

/// Generate and apply Mood Vault schema migrations.
#[derive(Debug, Parser)]
#[command(name = "moodvault-migrate", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Migrations directory (overrides MIGRATIONS_DIR)
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the current schema as the baseline migration
    Generate {
        #[arg(long, default_value = "schema")]
        name: String,

        /// Replace existing migrations in the output directory
        #[arg(long)]
        force: bool,
    },
    /// Print the rendered DDL to stdout
    Print,
    /// Apply pending migrations against DATABASE_URL
    Apply,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodvault_api=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = MigrationConfig::from_env()?;
    if let Some(out) = cli.out {
        config.out = out;
    }

    match cli.command {
        Command::Generate { name, force } => {
            let path = migrate::generate(&config, &name, Utc::now(), force)
                .context("Failed to generate migration")?;
            println!("{}", path.display());
        }
        Command::Print => {
            print!("{}", migrate::render_migration(&config));
        }
        Command::Apply => {
            let count = migrate::apply(&config)
                .await
                .context("Failed to apply migrations")?;
            println!("{count} migration(s) up to date in {}", config.out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_name_and_out() {
        let cli = Cli::try_parse_from([
            "moodvault-migrate",
            "generate",
            "--name",
            "add_indexes",
            "--out",
            "db/migrations",
        ])
        .unwrap();
        assert_eq!(cli.out, Some(PathBuf::from("db/migrations")));
        assert!(matches!(
            cli.command,
            Command::Generate { ref name, force: false } if name == "add_indexes"
        ));
    }

    #[test]
    fn test_generate_force_flag() {
        let cli = Cli::try_parse_from(["moodvault-migrate", "generate", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Generate { ref name, force: true } if name == "schema"
        ));
    }
}
