//! Role inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use workgrid_core::error::AppError;
use workgrid_core::types::pagination::{MAX_LIMIT, PageRequest};
use workgrid_database::{RoleFilter, Stores};
use workgrid_entity::role::Role;
use workgrid_entity::user::UserType;

use crate::output::{self, OutputFormat};

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List roles
    List {
        /// Only roles held by this actor type
        #[arg(long)]
        actor_type: Option<UserType>,
        /// Include inactive roles
        #[arg(long)]
        all: bool,
    },
}

/// One line of `role list`.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct RoleRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display name")]
    display_name: String,
    #[tabled(rename = "Actor")]
    actor_type: String,
    #[tabled(rename = "System")]
    is_system: bool,
    #[tabled(rename = "Active")]
    is_active: bool,
    #[tabled(rename = "Permissions")]
    permissions: usize,
}

/// Execute role commands
pub async fn execute(args: &RoleArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let stores = Stores::connect(&config.database).await?;

    match &args.command {
        RoleCommand::List { actor_type, all } => {
            let filter = RoleFilter {
                actor_type: *actor_type,
                is_active: if *all { None } else { Some(true) },
            };

            let mut roles: Vec<Role> = Vec::new();
            let mut page = PageRequest::new(1, MAX_LIMIT);
            loop {
                let (batch, total) = stores.roles.list_roles(&filter, page).await?;
                let fetched = batch.len() as u64;
                roles.extend(batch);
                if fetched == 0 || roles.len() as u64 >= total {
                    break;
                }
                page = PageRequest::new(page.page + 1, MAX_LIMIT);
            }

            let mut rows = Vec::with_capacity(roles.len());
            for role in roles {
                let permissions = stores.roles.role_permissions(role.id).await?.len();
                rows.push(RoleRow {
                    name: role.name,
                    display_name: role.display_name,
                    actor_type: role.actor_type.to_string(),
                    is_system: role.is_system,
                    is_active: role.is_active,
                    permissions,
                });
            }

            output::print_list(&rows, format);
        }
    }

    Ok(())
}
