//! Captain Backend
//!
//! Authentication service for captains: register, login, profile and logout.

use captain_backend::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    if let Ok(path) = dotenv {
        info!(path = ?path, "Loaded environment file");
    }
    info!("Starting Captain Backend v{}", captain_backend::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        path = ?config.database.path,
        pool_size = config.database.connection_pool_size,
        "Database configuration"
    );
    info!(
        token_ttl = config.auth.token_ttl,
        uniform_login_errors = config.auth.uniform_login_errors,
        "Auth configuration"
    );

    // Opening the database applies pending migrations
    info!("Initializing database...");
    let pool_size = u32::try_from(config.database.connection_pool_size).unwrap_or(u32::MAX);
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        pool_size,
        Duration::from_millis(config.database.busy_timeout),
    )?);
    info!(
        path = ?db.path(),
        pool_size = db.pool_size(),
        "Database initialized successfully"
    );

    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, db)?;

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
