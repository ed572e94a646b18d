use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shared::{Config, MarketClient, WatchlistStore};

mod charts;
mod routes;
mod state;
mod views;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting CoinBoard dashboard server...");

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let static_dir = config.static_dir.clone();

    let market = MarketClient::new(&config)?;
    let watchlist = Mutex::new(WatchlistStore::load(&config.watchlist_path));
    info!("Watchlist loaded from {}", config.watchlist_path);

    let state = Arc::new(AppState {
        config,
        market,
        watchlist,
    });

    let app = Router::new()
        .route("/", get(routes::dashboard::page))
        .route("/market", get(routes::market::page))
        .route("/coin/:id", get(routes::coin::page))
        .route("/search", get(routes::search::page))
        .route("/watchlist/toggle", post(routes::watchlist::toggle))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Dashboard listening on http://{bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
