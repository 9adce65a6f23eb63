//! Seed the permission catalog and system roles.

use workgrid_core::error::AppError;
use workgrid_database::Stores;

use crate::output::{self, OutputFormat};

/// Execute the seed command
pub async fn execute(env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let stores = Stores::connect(&config.database).await?;

    let report = workgrid_service::seed_catalog(&stores).await?;
    tracing::debug!(?report, "Catalog seeded");
    output::print_item(&report, format);
    output::print_success("Permission catalog is up to date.");
    Ok(())
}
