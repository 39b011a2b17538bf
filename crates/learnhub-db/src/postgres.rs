//! PostgreSQL implementation of the storage traits.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use learnhub_models::{NewUser, RefreshTokenRecord, RoleId, RoleRecord, UserId, UserRecord};

use crate::error::StoreError;
use crate::store::{RefreshTokenStore, RoleStore, UserStore};

const USER_COLUMNS: &str = "id, email, pseudo, password_hash, legacy_role, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = format!(
            "INSERT INTO users (email, pseudo, password_hash, legacy_role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user.email)
            .bind(user.pseudo)
            .bind(user.password_hash)
            .bind(user.legacy_role)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let records = sqlx::query_as::<_, UserRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

#[async_trait]
impl RoleStore for PgStore {
    #[instrument(skip(self))]
    async fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let roles =
            sqlx::query_as::<_, RoleRecord>("SELECT id, name, description FROM roles ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        let role =
            sqlx::query_as::<_, RoleRecord>("SELECT id, name, description FROM roles WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError> {
        let role = sqlx::query_as::<_, RoleRecord>(
            "SELECT id, name, description FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn insert_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError> {
        let role = sqlx::query_as::<_, RoleRecord>(
            r#"INSERT INTO roles (name, description) VALUES ($1, $2)
            RETURNING id, name, description"#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn insert_role_if_absent(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"INSERT INTO roles (name, description) VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING"#,
        )
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<RoleRecord>, StoreError> {
        let role = sqlx::query_as::<_, RoleRecord>(
            r#"UPDATE roles SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description"#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn roles_of_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError> {
        let roles = sqlx::query_as::<_, RoleRecord>(
            r#"SELECT r.id, r.name, r.description
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY ur.assigned_at, ur.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn users_with_role(&self, role_id: RoleId) -> Result<Vec<UserId>, StoreError> {
        let users = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&record.token)
            .bind(record.user_id)
            .bind(record.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT token, user_id, expires_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip_all)]
    async fn delete_refresh_token(&self, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all)]
    async fn take_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "DELETE FROM refresh_tokens WHERE token = $1 RETURNING token, user_id, expires_at",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete_refresh_tokens_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
