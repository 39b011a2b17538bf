//! Storage seams.
//!
//! Services depend on these traits, never on a concrete backend. The
//! PostgreSQL implementation lives in [`crate::postgres`], the in-memory one
//! used by tests in [`crate::memory`]. Both report unique constraint
//! violations as [`StoreError::UniqueViolation`].

use async_trait::async_trait;

use learnhub_models::{NewUser, RefreshTokenRecord, RoleId, RoleRecord, UserId, UserRecord};

use crate::error::StoreError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Every user, ordered by id.
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Every role, ordered by id.
    async fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError>;

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError>;

    async fn insert_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError>;

    /// Inserts the role unless one with that name exists. Existing rows are
    /// left untouched. Returns whether a row was inserted.
    async fn insert_role_if_absent(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Overwrites name and description. `None` if the role does not exist.
    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<RoleRecord>, StoreError>;

    /// Deletes the role and, by cascade, its assignments.
    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] if the pair already exists.
    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError>;

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId)
    -> Result<bool, StoreError>;

    /// Roles held by the user, in assignment order.
    async fn roles_of_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError>;

    async fn users_with_role(&self, role_id: RoleId) -> Result<Vec<UserId>, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, StoreError>;
    /// Deletes the token and returns the removed record in one step, so two
    /// concurrent callers never both receive it.
    async fn take_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Returns the number of deleted rows. Zero is not an error.
    async fn delete_refresh_tokens_for_user(&self, user_id: UserId) -> Result<u64, StoreError>;
}

/// Everything the application needs from a backend.
pub trait Store: UserStore + RoleStore + RefreshTokenStore {}

impl<T> Store for T where T: UserStore + RoleStore + RefreshTokenStore {}
