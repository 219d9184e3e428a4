use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod aggregator;
mod db;
mod error;
mod filter;
mod http;
mod merge;
#[cfg(test)]
mod memory;
mod models;
mod policy;
mod registry;
mod report;
mod store;

use aggregator::Aggregator;
use db::PgStore;

#[derive(Parser)]
#[command(name = "signoff-tracker")]
#[command(about = "Supervisor sign-off tracking for security shift reports", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed reports
    Seed,
    /// Import reports of one kind from a CSV file
    Import {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown sign-off report for a supervisor
    Report {
        #[arg(long)]
        supervisor: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Serve the sign-off API over HTTP
    Serve {
        #[arg(long, env = "SIGNOFF_LISTEN", default_value = "127.0.0.1:5000")]
        listen: String,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let pool = PgPoolOptions::new()
        .max_connections(cli.max_connections)
        .connect(&cli.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool);

    match cli.command {
        Commands::InitDb => {
            db::init_db(store.pool()).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&store).await?;
            println!("Inserted {inserted} seed reports.");
        }
        Commands::Import { kind, csv } => {
            let kind = registry::find(&kind)?;
            let inserted = db::import_csv(&store, kind, &csv).await?;
            println!("Inserted {inserted} {} reports from {}.", kind.name, csv.display());
        }
        Commands::Report { supervisor, out } => {
            let aggregator = Aggregator::new(Arc::new(store));
            let unsigned = aggregator.unsigned_by_supervisor_all(&supervisor).await?;
            let signed = aggregator.signed_by_supervisor_all(&supervisor).await?;
            let report = report::build_report(
                &supervisor,
                chrono::Local::now().date_naive(),
                &unsigned,
                &signed,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Serve { listen } => {
            registry::validate_registry(&store)
                .await
                .context("report tables do not match the registry")?;

            let app = http::router(Aggregator::new(Arc::new(store)));
            let listener = tokio::net::TcpListener::bind(&listen)
                .await
                .with_context(|| format!("failed to bind {listen}"))?;
            info!(%listen, "sign-off API listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
