// Go-Banking API Service
// Customer onboarding, accounts, transfers and Bank Z balances over HTTP

use banking_api::{
    config::{LogFormat, LoggingConfig},
    ApiConfig, AppState,
};
use ledger_core::Ledger;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_line_number(true)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    config.validate().map_err(anyhow::Error::msg)?;

    init_tracing(&config.logging);
    info!("Starting Go-Banking API");

    let ledger = Arc::new(Ledger::open(config.ledger.clone())?);
    let app = banking_api::app(AppState::new(ledger));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on: {}", bind_addr);
    info!("   POST /api/customers - Create customer");
    info!("   GET  /api/customers/:customer_id/accounts - List accounts");
    info!("   POST /api/customers/:customer_id/transfers - Transfer money");
    info!("   GET  /api/customers/:customer_id/bankz/balances - Bank Z balances");
    info!("   GET  /api/customers/:customer_id/transactions - List transactions");
    info!("   GET  /health - Health check");
    info!("   GET  /metrics - Prometheus metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
