use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod indexer;
mod models;
mod services;
mod utils;

use config::Config;
use constants::{API_VERSION, RESOURCES_PAGE_LIMIT};
use indexer::AptosClient;
use services::WalletLookupService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aptos_wallet_lookup=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Aptos wallet lookup");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Default network: {}", config.default_network);

    let chain = Arc::new(AptosClient::new(
        RESOURCES_PAGE_LIMIT,
        config.request_timeout(),
    )?);
    let service = Arc::new(WalletLookupService::new(&config, chain));

    // Log every published view
    let mut views = service.subscribe();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            tracing::debug!(
                "Session generation {} is {:?} on {}",
                view.generation,
                view.phase,
                view.network
            );
        }
    });

    let app_state = api::AppState {
        config: config.clone(),
        service,
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = api::cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        // Health
        .route("/health", get(api::health::health_check))
        // Session
        .route("/api/v1/session", get(api::lookup::get_session))
        .route("/api/v1/lookup", post(api::lookup::lookup_wallet))
        // Networks
        .route("/api/v1/network", put(api::network::select_network))
        .route("/api/v1/networks", get(api::network::list_networks))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
