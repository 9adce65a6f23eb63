//! CLI command definitions and dispatch.

pub mod admin;
pub mod migrate;
pub mod role;
pub mod seed;
pub mod serve;

use clap::{Parser, Subcommand};

use workgrid_core::config::AppConfig;
use workgrid_core::error::AppError;

use crate::output::OutputFormat;

/// WorkGrid identity and access administration
#[derive(Debug, Parser)]
#[command(name = "workgrid", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to load (`config/{env}.toml`)
    #[arg(short, long, env = "WORKGRID_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Seed the permission catalog and system roles
    Seed,
    /// Admin user management
    Admin(admin::AdminArgs),
    /// Role inspection
    Role(role::RoleArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Seed => seed::execute(&self.env, self.format).await,
            Commands::Admin(args) => admin::execute(args, &self.env, self.format).await,
            Commands::Role(args) => role::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for `env`
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: interactive input errors
pub(crate) fn input_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
