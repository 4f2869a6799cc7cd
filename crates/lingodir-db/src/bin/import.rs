//! lingodir-import: load companies and tags from a CSV file.
//!
//! Safe to re-run: companies and tags are matched by name and links are only
//! written once.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lingodir_db::{load_csv, Database, PoolConfig};

const DEFAULT_CSV_PATH: &str = "company_tag_sample.csv";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/lingodir";

#[derive(Parser)]
#[command(name = "lingodir-import")]
#[command(author, version, about = "Bulk-load companies and tags into lingodir")]
struct Cli {
    /// CSV file to load
    #[arg(long, env = "INIT_CSV_PATH", default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Skip running migrations before loading
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Values from .env must be visible before clap reads the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lingodir_db=info,lingodir_core=info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(subsystem = "import", error = %format!("{:#}", e), "Import failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = File::open(&cli.csv)
        .with_context(|| format!("Failed to open CSV file {}", cli.csv.display()))?;

    let db = Database::connect_with_config(&cli.database_url, PoolConfig::from_env())
        .await
        .context("Failed to connect to database")?;

    if !cli.skip_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    info!(
        subsystem = "import",
        path = %cli.csv.display(),
        "Loading CSV"
    );
    let summary = load_csv(&db.service(), file).await?;

    info!(
        subsystem = "import",
        rows_read = summary.rows_read,
        rows_skipped = summary.rows_skipped,
        companies_created = summary.companies_created,
        links_created = summary.links_created,
        "Initial data load complete"
    );
    Ok(())
}
