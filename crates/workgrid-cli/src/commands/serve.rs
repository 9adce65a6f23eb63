//! Start the WorkGrid server.

use clap::Args;

use workgrid_core::error::AppError;
use workgrid_database::Stores;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Seed the permission catalog before serving
    #[arg(long)]
    pub seed: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting WorkGrid server...");
    println!("  Address:  {}", config.server.bind_address());
    println!("  Database: {}", config.database.provider);

    let stores = Stores::connect(&config.database).await?;

    if args.seed || config.database.seed_on_startup {
        workgrid_service::seed_catalog(&stores).await?;
        println!("  Permission catalog seeded.");
    }

    workgrid_api::run_server(config, stores).await
}
