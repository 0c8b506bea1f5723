use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod database;
mod error;
mod log_requests;
mod passwords;
mod players;
mod rate_limit;
mod repository;
mod routes;
mod stats;

use config::Config;
use database::DatabaseHandle;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseHandle,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Stats server starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let db = DatabaseHandle::new();
    if let Err(e) = db.connect(&config.database).await {
        error!("Failed to connect to database: {e}");
        std::process::exit(1);
    }
    info!("Database initialized successfully");

    let state = AppState { db: db.clone() };
    let app = routes::build_router(state, rate_limit::create_rate_limiter(config.rate_limit_per_second));

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {e}", config.listen_addr);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", config.listen_addr);

    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Ok(database) = db.get_instance() {
        database.close().await;
    }

    if let Err(e) = served {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
