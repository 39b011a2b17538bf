use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use dotenvy::dotenv;

use learnhub::logging::init_logging;
use learnhub_cli::{AdminOutcome, AdminTools, cli_error};
use learnhub_config::{AppEnvironment, DatabaseConfig, bcrypt_cost_from_env};
use learnhub_core::errors::expose_internal_errors;
use learnhub_db::{PgPool, PgStore, init_db_pool, run_migrations};
use learnhub_models::UserId;

#[derive(Parser)]
#[command(name = "learnhub-cli")]
#[command(about = "LearnHub CLI - Administrative tools for LearnHub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create the predefined roles that are missing
    InitRoles,
    /// Create an admin account, or promote an existing one
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Grant a role to a user
    AssignRole {
        #[arg(short = 'u', long)]
        user_id: UserId,

        /// Role name, e.g. teacher
        #[arg(short = 'r', long)]
        role: String,
    },
    /// Revoke a role from a user
    RemoveRole {
        #[arg(short = 'u', long)]
        user_id: UserId,

        #[arg(short = 'r', long)]
        role: String,
    },
    /// Print the roles held by a user
    ListUserRoles {
        #[arg(short = 'u', long)]
        user_id: UserId,
    },
    /// Turn the legacy single-role column into role assignments
    MigrateLegacyRoles,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging(AppEnvironment::Development, "warn");
    expose_internal_errors(true);

    let cli = Cli::parse();

    let database = DatabaseConfig::from_env().context("Invalid database configuration")?;
    let pool = init_db_pool(&database)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::InitRoles => {
            let created = tools(pool)?.init_roles().await.map_err(cli_error)?;
            println!("✅ Roles initialized ({} created)", created);
            Ok(())
        }
        Commands::CreateAdmin { email, password } => {
            handle_create_admin(tools(pool)?, &email, password).await
        }
        Commands::AssignRole { user_id, role } => {
            let assigned = tools(pool)?
                .assign_role(user_id, &role)
                .await
                .map_err(cli_error)?;
            if assigned {
                println!("✅ Role '{}' assigned to user {}", role, user_id);
            } else {
                println!("ℹ️  User {} already has role '{}'", user_id, role);
            }
            Ok(())
        }
        Commands::RemoveRole { user_id, role } => {
            let removed = tools(pool)?
                .remove_role(user_id, &role)
                .await
                .map_err(cli_error)?;
            if removed {
                println!("✅ Role '{}' removed from user {}", role, user_id);
            } else {
                println!("ℹ️  User {} did not have role '{}'", user_id, role);
            }
            Ok(())
        }
        Commands::ListUserRoles { user_id } => {
            let roles = tools(pool)?
                .list_user_roles(user_id)
                .await
                .map_err(cli_error)?;
            if roles.is_empty() {
                println!("User {} has no roles", user_id);
            }
            for role in roles {
                println!(
                    "{}\t{}\t{}",
                    role.id(),
                    role.name(),
                    role.description().unwrap_or("")
                );
            }
            Ok(())
        }
        Commands::MigrateLegacyRoles => {
            let report = tools(pool)?
                .migrate_legacy_roles()
                .await
                .map_err(cli_error)?;
            println!(
                "✅ Legacy roles migrated: {} users seen, {} assignments created",
                report.users_seen, report.assignments_created
            );
            Ok(())
        }
    }
}

fn tools(pool: PgPool) -> anyhow::Result<AdminTools> {
    let bcrypt_cost = bcrypt_cost_from_env().context("Invalid configuration")?;
    Ok(AdminTools::new(Arc::new(PgStore::new(pool)), bcrypt_cost))
}

async fn handle_migrate(pool: &PgPool) -> anyhow::Result<()> {
    run_migrations(pool).await.context("Migration failed")?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_create_admin(
    tools: AdminTools,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let (user, outcome) = tools
        .create_admin(email, &password)
        .await
        .map_err(cli_error)?;

    match outcome {
        AdminOutcome::Created => println!("\n✅ Admin created successfully!"),
        AdminOutcome::Promoted => println!("\n✅ Existing user promoted to admin"),
    }
    println!("   ID: {}", user.id);
    println!("   Email: {}", email);
    Ok(())
}
