//! Grocery Extractor - turns recipes and food photos into shopping lists.

mod api;
mod config;
mod error;
mod grocery;
mod heuristics;
mod llm;
mod orchestrator;
mod payment;
mod schema;
mod vision;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::AppConfig;
use grocery::GroceryStore;
use orchestrator::{Extractor, Providers};
use payment::PaymentClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "grocery_extractor=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let client = reqwest::Client::new();

    let extractor = Extractor::new(Providers::from_config(&config, client.clone()));
    let availability = extractor.availability();
    info!("Providers: {:?}", availability);
    if !availability.any() {
        error!("No AI providers configured; extraction requests will fail");
    }

    let state = AppState {
        extractor: Arc::new(extractor),
        payments: Arc::new(PaymentClient::new(client, config.payment.clone())),
        groceries: GroceryStore::new(),
    };

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
