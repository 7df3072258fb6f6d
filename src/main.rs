//! # LAW-GPT Backend Main Driver
//!
//! ## Purpose
//! Main entry point for the search backend. Orchestrates configuration,
//! logging, store initialization, and the web server, and doubles as the
//! ingestion and health-check command line.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment
//!   variables
//! - **Output**: Running web server with search API endpoints, or a completed
//!   ingestion/health run
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Open the document store (a failure here is tolerated: the server still
//!    starts and every search call fails fast until the store is fixed)
//! 4. Start the web API server
//! 5. Shut down on SIGINT

use clap::{Arg, Command};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use lawgpt_backend::{
    api::ApiServer,
    config::Config,
    errors::Result,
    explain::Explainer,
    ingest::IngestionPipeline,
    search::SearchEngine,
    store::{DocumentStore, SledDocumentStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("lawgpt-server")
        .version("1.1.0")
        .author("LAW-GPT Team")
        .about("Keyword search backend for Indian bare acts with plain-language explanations")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("ingest")
                .long("ingest")
                .value_name("DIR")
                .help("Ingest per-page act text files from DIR and exit"),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Run health checks and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    // Override port if specified
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config);

    info!("Starting LAW-GPT backend v1.1.0");
    info!("Configuration loaded from: {}", config_path);

    if matches.get_flag("check-health") {
        return run_health_checks(&config).await;
    }

    if let Some(dir) = matches.get_one::<String>("ingest") {
        return run_ingestion(&config, Path::new(dir)).await;
    }

    // Initialize application components
    let app_state = initialize_components(config.clone());

    // Start the API server
    let server = ApiServer::new(app_state);

    info!(
        "LAW-GPT backend started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal. The actix server future is `!Send`, so it is
    // polled in place by `select!` rather than moved onto another task.
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        res = server.run() => {
            if let Err(e) = res {
                error!("Server error: {}", e);
            }
            warn!("Server stopped unexpectedly");
        }
    }

    info!("LAW-GPT backend shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json_format {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Initialize all application components.
///
/// A store that fails to open does not abort startup: the original deployment
/// keeps serving so operators can see the failure in responses, and every
/// search call fails fast with `StoreUninitialized` until a restart with a
/// working store.
fn initialize_components(config: Arc<Config>) -> AppState {
    let store: Option<Arc<dyn DocumentStore>> = match SledDocumentStore::new(&config.store) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            error!("Failed to initialize document store: {}", e);
            None
        }
    };

    let engine = store
        .as_ref()
        .map(|store| Arc::new(SearchEngine::new(config.search.clone(), store.clone())));

    let explainer = Arc::new(Explainer::new(config.explain.clone()));

    AppState {
        config,
        engine,
        store,
        explainer,
    }
}

/// Ingest a directory of act text files and exit
async fn run_ingestion(config: &Config, dir: &Path) -> Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(SledDocumentStore::new(&config.store)?);
    let pipeline = IngestionPipeline::new(config.ingestion.clone(), store);

    let stats = pipeline.ingest_directory(dir).await?;
    info!(
        "Ingested {} pages from {} files ({} empty pages skipped)",
        stats.pages_written, stats.files, stats.pages_skipped
    );
    Ok(())
}

/// Run health checks and exit
async fn run_health_checks(config: &Config) -> Result<()> {
    info!("Running health checks...");

    let store = SledDocumentStore::new(&config.store)?;
    store.health_check().await?;
    info!("✓ Document store is healthy");

    let stats = store.stats().await?;
    info!("✓ {} documents indexed", stats.total_documents);

    info!("All health checks passed");
    Ok(())
}
