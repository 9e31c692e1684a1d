use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slotsync::config::Config;
use slotsync::gate::AdmissionGate;
use slotsync::scheduler::{Lane, SyncScheduler};
use slotsync::server::{serve, AppState};
use slotsync::storage::{create_sqlite_store, Reconciler};
use slotsync::sync::client::PartnerClient;
use slotsync::sync::pipeline::FetchPipeline;

#[derive(Parser)]
#[command(
    name = "slotsync",
    version,
    about = "Partner availability inventory sync engine",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync scheduler and REST API server
    Serve {
        /// Override the bind address from the configuration
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run a single sync lane once and exit
    SyncOnce {
        /// Lane to run (fine, medium, coarse)
        #[arg(short, long, default_value = "fine")]
        lane: Lane,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            tracing::info!(addr = %config.server.bind_addr, "Starting serve command");
            run_server(config).await?;
        }

        Commands::SyncOnce { lane } => {
            tracing::info!(lane = %lane, "Starting sync-once command");
            sync_once(config, lane).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("slotsync=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("slotsync=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn build_scheduler(config: &Config) -> Result<(Arc<SyncScheduler>, slotsync::storage::SharedInventoryStore)> {
    let store = create_sqlite_store(&config.database.sqlite_path)?;

    let client = Arc::new(PartnerClient::from_config(&config.partner)?);
    let gate = Arc::new(AdmissionGate::new(
        config.gate.max_concurrent,
        config.min_call_interval(),
    ));
    let pipeline = FetchPipeline::new(client, gate);
    let reconciler = Reconciler::new(store.clone());

    let scheduler = Arc::new(SyncScheduler::new(
        pipeline,
        reconciler,
        config.sync.product_ids.clone(),
        config.sync.chunk_days,
    ));

    Ok((scheduler, store))
}

async fn run_server(config: Config) -> Result<()> {
    slotsync::metrics::init_metrics();

    let (scheduler, store) = build_scheduler(&config)?;
    scheduler.start();

    let state = AppState::new(scheduler.clone(), store);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutdown signal received");
    };

    serve(&config.server, state, shutdown).await?;

    scheduler.shutdown().await;
    tracing::info!("slotsync stopped");
    Ok(())
}

async fn sync_once(config: Config, lane: Lane) -> Result<()> {
    let (scheduler, _store) = build_scheduler(&config)?;

    scheduler.run_lane(lane).await;

    let status = scheduler.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
