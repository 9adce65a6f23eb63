//! WorkGrid Server: identity and access backend.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use workgrid_core::config::AppConfig;
use workgrid_core::error::AppError;
use workgrid_database::Stores;

#[tokio::main]
async fn main() {
    let env = std::env::var("WORKGRID_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, &env).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig, env: &str) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), env, "Starting WorkGrid");

    let stores = Stores::connect(&config.database).await?;

    if config.database.seed_on_startup {
        let report = workgrid_service::seed_catalog(&stores).await?;
        tracing::info!(
            groups = report.groups_created,
            permissions = report.permissions_created,
            roles = report.roles_created,
            links = report.links_created,
            "Permission catalog seeded"
        );
    }

    workgrid_api::run_server(config, stores).await
}
