use std::sync::Arc;

use anyhow::anyhow;
use tracing::{error, info, instrument, warn};

use learnhub_core::AppError;
use learnhub_core::password::{hash_password_with_cost, verify_password};
use learnhub_db::{Store, StoreError};
use learnhub_models::{NewUser, RegisterRequest, RoleName, UserId, UserRecord};

use crate::modules::roles::service::RoleService;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Users and their password hashes.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn Store>,
    roles: RoleService,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>, roles: RoleService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            roles,
            bcrypt_cost,
        }
    }

    /// Creates a user with the base role. Emails are stored lowercased.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserRecord, AppError> {
        let email = normalize_email(&request.email);

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(anyhow!("Email already in use")));
        }

        let password_hash = request
            .password
            .as_deref()
            .map(|password| hash_password_with_cost(password, self.bcrypt_cost))
            .transpose()?;

        let user = self
            .store
            .insert_user(NewUser {
                email: Some(email),
                pseudo: request.pseudo,
                password_hash,
                legacy_role: None,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => {
                    AppError::conflict(anyhow!("Email already in use"))
                }
                other => AppError::from(other),
            })?;

        match self.roles.assign_role_by_name(user.id, RoleName::BASE).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                warn!(user_id = %user.id, "Base role missing; run init-roles");
            }
            Err(e) => return Err(e),
        }

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks an email/password pair.
    ///
    /// Unknown email, a user without a local password and a wrong password
    /// all fail with the same 401.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, AppError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!(email = %email, "Login failed: unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let Some(hash) = user.password_hash.as_deref() else {
            warn!(email = %email, "Login failed: no local password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        match verify_password(password, hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(email = %email, "Login failed: wrong password");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e.error, "Stored password hash is unreadable");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<UserRecord, AppError> {
        self.store
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .store
            .find_user_by_email(&normalize_email(email))
            .await?)
    }

    #[instrument(skip(self, password))]
    pub async fn set_password(&self, id: UserId, password: &str) -> Result<(), AppError> {
        let hash = hash_password_with_cost(password, self.bcrypt_cost)?;
        self.store.update_password_hash(id, &hash).await?;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
