use anyhow::Result;
use clap::{Parser, Subcommand};
use jobscout_storage::{ListingStore, SqliteStore};
use jobscout_sync::ScoutConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Job-listing aggregation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one aggregation batch and print the summary
    Run,
    /// Keep running batches on the configured cron schedule
    Watch,
    /// Mark a persisted listing as applied
    MarkApplied { external_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let summary = jobscout_sync::run_once_from_env().await?;
            println!(
                "run complete: run_id={} fetched={} duplicates={} below_floor={} accepted={}",
                summary.run_id,
                summary.fetched,
                summary.duplicates,
                summary.below_floor,
                summary.accepted
            );
        }
        Commands::Watch => {
            let config = ScoutConfig::from_env();
            jobscout_sync::run_scheduler(config).await?;
        }
        Commands::MarkApplied { external_id } => {
            let config = ScoutConfig::from_env();
            let store = SqliteStore::open(&config.db_path).await?;
            if store.mark_applied(&external_id).await? {
                println!("marked applied: {external_id}");
            } else {
                println!("no listing with external_id {external_id}");
            }
        }
    }

    Ok(())
}
