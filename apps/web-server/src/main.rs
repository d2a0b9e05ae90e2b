//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::HttpServer;

use web_server::build_app;
use web_server::config::AppConfig;
use web_server::state::AppState;
use web_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    config.log_warnings();

    let state = AppState::new(&config).await?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        storage = state.storage_name(),
        "Starting Yatube web server"
    );

    HttpServer::new(move || build_app(state.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
