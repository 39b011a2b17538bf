use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use learnhub_core::AppError;
use learnhub_core::permissions::{permissions_for_roles, roles_grant};
use learnhub_db::{Store, StoreError};
use learnhub_models::{CreateRoleDto, Role, RoleId, RoleName, RoleRecord, UpdateRoleDto, UserId};

/// Outcome of the legacy single-role migration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LegacyMigrationReport {
    pub users_seen: usize,
    pub assignments_created: usize,
}

/// Maps the pre-RBAC role column to a role name.
pub fn legacy_role_mapping(legacy: Option<&str>) -> RoleName {
    let Some(legacy) = legacy.map(str::trim).filter(|s| !s.is_empty()) else {
        return RoleName::BASE;
    };

    match legacy {
        "3" | "3000" => RoleName::Admin,
        "2" | "2000" => RoleName::ContentCreator,
        "1" | "1000" => RoleName::Teacher,
        other => other.parse().unwrap_or(RoleName::BASE),
    }
}

/// Role definitions, assignments and permission lookups.
#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn Store>,
}

impl RoleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ensures the five predefined roles exist. Existing rows, including
    /// their descriptions, are left as they are. Returns how many were created.
    #[instrument(skip(self))]
    pub async fn initialize_default_roles(&self) -> Result<usize, AppError> {
        let mut created = 0;
        for name in RoleName::ALL {
            if self
                .store
                .insert_role_if_absent(name.as_str(), Some(name.default_description()))
                .await?
            {
                created += 1;
            }
        }

        info!(created, "Default roles initialized");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = self.store.list_roles().await?;
        Ok(roles.into_iter().map(Role::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_role_by_id(&self, id: RoleId) -> Result<Role, AppError> {
        self.store
            .find_role_by_id(id)
            .await?
            .map(Role::from)
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
    }

    #[instrument(skip(self))]
    pub async fn get_role_by_name(&self, name: &str) -> Result<Role, AppError> {
        self.store
            .find_role_by_name(name)
            .await?
            .map(Role::from)
            .ok_or_else(|| AppError::not_found(anyhow!("Role '{}' not found", name)))
    }

    #[instrument(skip(self))]
    pub async fn create_role(&self, dto: CreateRoleDto) -> Result<Role, AppError> {
        let name = dto
            .name
            .parse::<RoleName>()
            .map_err(AppError::bad_request)?;

        let record = self
            .store
            .insert_role(name.as_str(), dto.description.as_deref())
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => {
                    AppError::conflict(anyhow!("Role '{}' already exists", name))
                }
                other => AppError::from(other),
            })?;

        info!(role_id = %record.id, role = %record.name, "Role created");
        Ok(Role::from(record))
    }

    /// Applies a name and/or description change.
    ///
    /// Predefined roles keep their name; their description may change.
    #[instrument(skip(self))]
    pub async fn update_role(&self, id: RoleId, dto: UpdateRoleDto) -> Result<Role, AppError> {
        let current = self.get_role_by_id(id).await?;

        let name = match dto.name.as_deref() {
            Some(new_name) => current
                .ensure_renamable(new_name)
                .map_err(AppError::bad_request)?
                .as_str()
                .to_string(),
            None => current.name().to_string(),
        };
        let description = dto
            .description
            .or_else(|| current.description().map(str::to_string));

        let record = self
            .store
            .update_role(id, &name, description.as_deref())
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => {
                    AppError::conflict(anyhow!("Role '{}' already exists", name))
                }
                other => AppError::from(other),
            })?
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

        Ok(Role::from(record))
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: RoleId) -> Result<(), AppError> {
        let role = self.get_role_by_id(id).await?;
        role.ensure_deletable().map_err(AppError::bad_request)?;

        if !self.store.delete_role(id).await? {
            return Err(AppError::not_found(anyhow!("Role not found")));
        }

        info!(role_id = %id, role = %role.name(), "Role deleted");
        Ok(())
    }

    /// Returns `false` when the user already holds the role.
    #[instrument(skip(self))]
    pub async fn assign_role_to_user(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, AppError> {
        self.ensure_user_exists(user_id).await?;
        self.get_role_by_id(role_id).await?;

        match self.store.insert_user_role(user_id, role_id).await {
            Ok(()) => {
                info!(user_id = %user_id, role_id = %role_id, "Role assigned");
                Ok(true)
            }
            Err(StoreError::UniqueViolation { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Assigns a predefined role by name.
    #[instrument(skip(self))]
    pub async fn assign_role_by_name(
        &self,
        user_id: UserId,
        name: RoleName,
    ) -> Result<bool, AppError> {
        let role = self.get_role_by_name(name.as_str()).await?;
        self.assign_role_to_user(user_id, role.id()).await
    }

    /// Returns `false` when the user did not hold the role.
    #[instrument(skip(self))]
    pub async fn remove_role_from_user(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, AppError> {
        self.ensure_user_exists(user_id).await?;
        self.get_role_by_id(role_id).await?;

        let removed = self.store.delete_user_role(user_id, role_id).await?;
        if removed {
            info!(user_id = %user_id, role_id = %role_id, "Role removed");
        }
        Ok(removed)
    }

    /// Roles held by an existing user. Empty when the user holds none.
    #[instrument(skip(self))]
    pub async fn get_user_roles(&self, user_id: UserId) -> Result<Vec<Role>, AppError> {
        Ok(self
            .user_role_records(user_id)
            .await?
            .into_iter()
            .map(Role::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user_role_names(&self, user_id: UserId) -> Result<Vec<String>, AppError> {
        Ok(self
            .user_role_records(user_id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_users_with_role(&self, role_id: RoleId) -> Result<Vec<UserId>, AppError> {
        self.get_role_by_id(role_id).await?;
        Ok(self.store.users_with_role(role_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn user_has_role(&self, user_id: UserId, name: &str) -> Result<bool, AppError> {
        let names = self.get_user_role_names(user_id).await?;
        Ok(names.iter().any(|n| n == name))
    }

    /// Deduplicated, sorted union of the permissions of every held role.
    #[instrument(skip(self))]
    pub async fn get_user_permissions(&self, user_id: UserId) -> Result<Vec<String>, AppError> {
        let names = self.get_user_role_names(user_id).await?;
        Ok(permissions_for_roles(&names)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// No role, no permission.
    #[instrument(skip(self))]
    pub async fn user_has_permission(
        &self,
        user_id: UserId,
        permission: &str,
    ) -> Result<bool, AppError> {
        let names = self.get_user_role_names(user_id).await?;
        Ok(roles_grant(&names, permission))
    }

    /// Turns the legacy role column into role assignments.
    ///
    /// Safe to run repeatedly: existing assignments are skipped.
    #[instrument(skip(self))]
    pub async fn migrate_legacy_roles(&self) -> Result<LegacyMigrationReport, AppError> {
        self.initialize_default_roles().await?;

        let mut report = LegacyMigrationReport::default();
        for user in self.store.list_users().await? {
            report.users_seen += 1;
            let target = legacy_role_mapping(user.legacy_role.as_deref());

            match self.assign_role_by_name(user.id, target).await {
                Ok(true) => report.assignments_created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(user_id = %user.id, role = %target, error = %e, "Legacy role migration failed for user");
                }
            }
        }

        info!(
            users_seen = report.users_seen,
            assignments_created = report.assignments_created,
            "Legacy roles migrated"
        );
        Ok(report)
    }

    async fn user_role_records(&self, user_id: UserId) -> Result<Vec<RoleRecord>, AppError> {
        self.ensure_user_exists(user_id).await?;
        Ok(self.store.roles_of_user(user_id).await?)
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> Result<(), AppError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }
}
