//! # LearnHub CLI
//!
//! Administrative operations that have no HTTP surface: seeding roles,
//! bootstrapping the first admin and migrating legacy role columns.
//!
//! [`AdminTools`] wraps the same services the API uses, so the CLI and the
//! server apply identical rules.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::info;

use learnhub::modules::roles::service::{LegacyMigrationReport, RoleService};
use learnhub::modules::users::service::CredentialService;
use learnhub_core::AppError;
use learnhub_db::Store;
use learnhub_models::{RegisterRequest, Role, RoleName, UserId, UserRecord};

/// Services behind every CLI command.
pub struct AdminTools {
    roles: RoleService,
    credentials: CredentialService,
}

/// Whether `create-admin` made a new account or promoted an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created,
    Promoted,
}

impl AdminTools {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Self {
        let roles = RoleService::new(store.clone());
        let credentials = CredentialService::new(store, roles.clone(), bcrypt_cost);
        Self { roles, credentials }
    }

    pub async fn init_roles(&self) -> Result<usize, AppError> {
        self.roles.initialize_default_roles().await
    }

    /// Creates the account, or resets the password of an existing one, and
    /// grants it the admin role.
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserRecord, AdminOutcome), AppError> {
        self.roles.initialize_default_roles().await?;

        let (user, outcome) = match self.credentials.find_by_email(email).await? {
            Some(existing) => {
                self.credentials.set_password(existing.id, password).await?;
                (existing, AdminOutcome::Promoted)
            }
            None => {
                let user = self
                    .credentials
                    .register(RegisterRequest {
                        email: email.to_string(),
                        password: Some(password.to_string()),
                        pseudo: None,
                    })
                    .await?;
                (user, AdminOutcome::Created)
            }
        };

        self.roles.assign_role_by_name(user.id, RoleName::Admin).await?;
        info!(user_id = %user.id, ?outcome, "Admin account ready");
        Ok((user, outcome))
    }

    pub async fn assign_role(&self, user_id: UserId, role: &str) -> Result<bool, AppError> {
        let role = self.roles.get_role_by_name(role).await?;
        self.roles.assign_role_to_user(user_id, role.id()).await
    }

    pub async fn remove_role(&self, user_id: UserId, role: &str) -> Result<bool, AppError> {
        let role = self.roles.get_role_by_name(role).await?;
        self.roles.remove_role_from_user(user_id, role.id()).await
    }

    pub async fn list_user_roles(&self, user_id: UserId) -> Result<Vec<Role>, AppError> {
        self.roles.get_user_roles(user_id).await
    }

    pub async fn migrate_legacy_roles(&self) -> Result<LegacyMigrationReport, AppError> {
        self.roles.migrate_legacy_roles().await
    }
}

/// Converts a service error into one `anyhow` can carry to `main`.
pub fn cli_error(err: AppError) -> anyhow::Error {
    anyhow!("{}", err.public_message())
}
