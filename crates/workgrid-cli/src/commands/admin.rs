//! Admin user management commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use uuid::Uuid;

use workgrid_auth::rbac::catalog;
use workgrid_auth::{PasswordValidator, SessionManager};
use workgrid_core::error::AppError;
use workgrid_database::Stores;
use workgrid_entity::user::UserType;
use workgrid_service::user::{AccountProvisioner, NewUserRequest, is_valid_phone};

use super::input_error;
use crate::output::{self, OutputFormat};

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new ADMIN user
    Create {
        /// 10-digit phone number (prompted when omitted)
        #[arg(long)]
        phone: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Admin role names to grant; repeat for several
        #[arg(short, long = "role", default_value = catalog::SUPER_ADMIN)]
        roles: Vec<String>,
    },
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let stores = Stores::connect(&config.database).await?;

    match &args.command {
        AdminCommand::Create {
            phone,
            email,
            name,
            password,
            roles,
        } => {
            // System roles must exist before they can be granted.
            workgrid_service::seed_catalog(&stores).await?;

            let phone = match phone {
                Some(p) => p.clone(),
                None => dialoguer::Input::<String>::new()
                    .with_prompt("Admin phone (10 digits)")
                    .validate_with(|input: &String| {
                        if is_valid_phone(input) {
                            Ok(())
                        } else {
                            Err("must be exactly 10 digits")
                        }
                    })
                    .interact_text()
                    .map_err(input_error)?,
            };

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Admin password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(input_error)?,
            };

            let mut role_ids: Vec<Uuid> = Vec::with_capacity(roles.len());
            for role_name in roles {
                let role = stores
                    .roles
                    .find_role_by_name(&role_name.to_uppercase())
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Role {role_name} not found")))?;
                role_ids.push(role.id);
            }

            let sessions = Arc::new(SessionManager::new(stores.clone(), config.auth.clone())?);
            let provisioner = AccountProvisioner::new(
                stores.clone(),
                sessions,
                PasswordValidator::new(&config.auth),
            );

            let user = provisioner
                .provision(
                    NewUserRequest {
                        phone,
                        email: email.clone(),
                        password,
                        user_type: UserType::Admin,
                        full_name: name.clone(),
                        company_name: None,
                    },
                    None,
                    &role_ids,
                    None,
                )
                .await?;
            tracing::info!(user_id = %user.id, roles = ?roles, "Admin created");

            output::print_item(&user, format);
            output::print_success(&format!(
                "Admin {} created with {} role(s).",
                user.phone,
                role_ids.len()
            ));
        }
    }

    Ok(())
}
