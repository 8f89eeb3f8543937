//! Revlens — revenue-intelligence analytics aggregation engine.
//!
//! Main entry point that initializes the record store, aggregator
//! services, and the API server.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use revlens_analytics::AnalyticsService;
use revlens_api::ApiServer;
use revlens_core::config::AppConfig;
use revlens_funnel::FunnelService;
use revlens_journey::JourneyService;
use revlens_store::InMemoryStore;

mod seed;

#[derive(Parser, Debug)]
#[command(name = "revlens-server")]
#[command(about = "Revenue-intelligence analytics aggregation engine")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "REVLENS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "REVLENS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Seed the in-memory store with demo telemetry
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revlens=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Revlens starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );

    // The in-memory store is the reference implementation of the query
    // contract; production deployments swap in a real store client here.
    let store = Arc::new(InMemoryStore::new());

    if cli.seed_demo {
        let seeded = seed::seed_demo(&store);
        info!(records = seeded, "Seeded demo telemetry");
    }

    let analytics = AnalyticsService::new(store.clone());
    let journey = JourneyService::new(store.clone());
    let funnel = FunnelService::new(store);

    let api_server = ApiServer::new(config, analytics, journey, funnel);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Revlens is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
