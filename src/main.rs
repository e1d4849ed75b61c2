use anyhow::Context;
use fundsync::api::{ApiClient, CoinClient, TradeInflowClient};
use fundsync::config::AppConfig;
use fundsync::db::PostgresStore;
use fundsync::ingest::{FundFlowIngestor, ListingIngestor};
use fundsync::schedule::Scheduler;
use fundsync::AuthService;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Logging needs the run mode, so config errors are reported on stderr
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    setup_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = format!("{e:#}"), "Startup failed");
        std::process::exit(1);
    }
}

fn setup_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(mode = config.mode.as_str(), app = "fundsync", "Application starting");

    let store = Arc::new(
        PostgresStore::connect(&config.database)
            .await
            .context("Database initialization failed")?,
    );

    let api = ApiClient::new(&config.api).context("Failed to build HTTP client")?;
    let auth = AuthService::new(api.clone(), config.login.clone());

    tracing::info!("Starting login process");
    let tokens = auth.login().await.context("Login failed")?;

    let scheduler = Scheduler::new(config.should_delay(), config.timer.skip_first_delay);
    tracing::info!(
        delay_enabled = scheduler.should_delay(),
        skip_first_delay = config.timer.skip_first_delay,
        "Scheduler configured"
    );

    // Loop 1: coin listing (every 4 hours, clock-aligned)
    let listing_task = {
        let ingestor = ListingIngestor::new(
            auth.clone(),
            CoinClient::new(api.clone()),
            store.clone(),
            config.listing.max_pages,
        );
        tokio::spawn(ingestor.run(scheduler))
    };

    // Loop 2: fund flow (every 5 minutes, clock-aligned)
    let fund_flow_task = {
        let ingestor = FundFlowIngestor::new(
            auth.clone(),
            TradeInflowClient::new(api.clone()),
            store.clone(),
            store.clone(),
        );
        tokio::spawn(ingestor.run(scheduler, tokens))
    };

    tracing::info!("All loops spawned");

    // Both loops run for the life of the process
    let (listing, fund_flow) = tokio::join!(listing_task, fund_flow_task);
    tracing::error!(?listing, ?fund_flow, "Ingestion loops exited");

    Ok(())
}
