//! In-memory implementation of the storage traits.
//!
//! Mirrors the PostgreSQL schema closely enough for integration tests: ids
//! are sequential, `users.email`, `roles.name` and `(user_id, role_id)` are
//! unique, and deleting a role removes its assignments.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use learnhub_models::{NewUser, RefreshTokenRecord, RoleId, RoleRecord, UserId, UserRecord};

use crate::error::StoreError;
use crate::store::{RefreshTokenStore, RoleStore, UserStore};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    roles: Vec<RoleRecord>,
    user_roles: Vec<(UserId, RoleId)>,
    refresh_tokens: Vec<RefreshTokenRecord>,
    next_user_id: i64,
    next_role_id: i64,
}

impl Tables {
    fn next_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn next_role_id(&mut self) -> RoleId {
        self.next_role_id += 1;
        RoleId::new(self.next_role_id)
    }

    fn role_name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .iter()
            .any(|r| r.name == name && Some(r.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.lock().await;

        if let Some(email) = &user.email {
            if tables.users.iter().any(|u| u.email.as_ref() == Some(email)) {
                return Err(StoreError::unique("users_email_key"));
            }
        }

        let now = Utc::now();
        let record = UserRecord {
            id: tables.next_user_id(),
            email: user.email,
            pseudo: user.pseudo,
            password_hash: user.password_hash,
            legacy_role: user.legacy_role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(record.clone());

        Ok(record)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = Some(password_hash.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.clone())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.clone())
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.role_name_taken(name, None) {
            return Err(StoreError::unique("roles_name_key"));
        }

        let record = RoleRecord {
            id: tables.next_role_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        tables.roles.push(record.clone());

        Ok(record)
    }

    async fn insert_role_if_absent(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<bool, StoreError> {
        match self.insert_role(name, description).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<RoleRecord>, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.role_name_taken(name, Some(id)) {
            return Err(StoreError::unique("roles_name_key"));
        }

        let Some(role) = tables.roles.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        role.name = name.to_string();
        role.description = description.map(str::to_string);

        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.roles.len();
        tables.roles.retain(|r| r.id != id);
        tables.user_roles.retain(|(_, role_id)| *role_id != id);
        Ok(tables.roles.len() < before)
    }

    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.user_roles.contains(&(user_id, role_id)) {
            return Err(StoreError::unique("user_roles_user_id_role_id_key"));
        }
        tables.user_roles.push((user_id, role_id));
        Ok(())
    }

    async fn delete_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.user_roles.len();
        tables.user_roles.retain(|pair| *pair != (user_id, role_id));
        Ok(tables.user_roles.len() < before)
    }

    async fn roles_of_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, rid)| tables.roles.iter().find(|r| r.id == *rid).cloned())
            .collect())
    }

    async fn users_with_role(&self, role_id: RoleId) -> Result<Vec<UserId>, StoreError> {
        let tables = self.tables.lock().await;
        let mut users: Vec<UserId> = tables
            .user_roles
            .iter()
            .filter(|(_, rid)| *rid == role_id)
            .map(|(uid, _)| *uid)
            .collect();
        users.sort();
        Ok(users)
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.refresh_tokens.iter().any(|t| t.token == record.token) {
            return Err(StoreError::unique("refresh_tokens_pkey"));
        }
        tables.refresh_tokens.push(record.clone());
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .refresh_tokens
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|t| t.token != token);
        Ok(tables.refresh_tokens.len() < before)
    }

    async fn take_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let mut tables = self.tables.lock().await;
        let position = tables.refresh_tokens.iter().position(|t| t.token == token);
        Ok(position.map(|index| tables.refresh_tokens.swap_remove(index)))
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|t| t.user_id != user_id);
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let store = MemoryStore::new();
        let user = NewUser {
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        store.insert_user(user.clone()).await.unwrap();

        let err = store.insert_user(user).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_users_without_email_do_not_conflict() {
        let store = MemoryStore::new();
        let first = store.insert_user(NewUser::default()).await.unwrap();
        let second = store.insert_user(NewUser::default()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_duplicate_assignment_is_unique_violation() {
        let store = MemoryStore::new();
        let user = store.insert_user(NewUser::default()).await.unwrap();
        let role = store.insert_role("teacher", None).await.unwrap();

        store.insert_user_role(user.id, role.id).await.unwrap();
        let err = store.insert_user_role(user.id, role.id).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_delete_role_cascades_to_assignments() {
        let store = MemoryStore::new();
        let user = store.insert_user(NewUser::default()).await.unwrap();
        let role = store.insert_role("legacy", None).await.unwrap();
        store.insert_user_role(user.id, role.id).await.unwrap();

        assert!(store.delete_role(role.id).await.unwrap());
        assert!(store.roles_of_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_role_if_absent_keeps_existing_description() {
        let store = MemoryStore::new();
        store.insert_role("admin", Some("custom")).await.unwrap();

        assert!(!store.insert_role_if_absent("admin", Some("default")).await.unwrap());
        let admin = store.find_role_by_name("admin").await.unwrap().unwrap();
        assert_eq!(admin.description.as_deref(), Some("custom"));
    }

    #[tokio::test]
    async fn test_roles_of_user_keep_assignment_order() {
        let store = MemoryStore::new();
        let user = store.insert_user(NewUser::default()).await.unwrap();
        let a = store.insert_role("user", None).await.unwrap();
        let b = store.insert_role("teacher", None).await.unwrap();
        store.insert_user_role(user.id, b.id).await.unwrap();
        store.insert_user_role(user.id, a.id).await.unwrap();

        let names: Vec<String> = store
            .roles_of_user(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["teacher", "user"]);
    }

    #[tokio::test]
    async fn test_take_refresh_token_hands_out_record_once() {
        let store = MemoryStore::new();
        let user = store.insert_user(NewUser::default()).await.unwrap();
        let record = RefreshTokenRecord {
            token: "abc".to_string(),
            user_id: user.id,
            expires_at: Utc::now() + chrono::Duration::days(1),
        };
        store.insert_refresh_token(&record).await.unwrap();

        let (first, second) = tokio::join!(
            store.take_refresh_token("abc"),
            store.take_refresh_token("abc")
        );
        let taken: Vec<_> = [first.unwrap(), second.unwrap()]
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(taken, vec![record]);
        assert!(store.find_refresh_token("abc").await.unwrap().is_none());
    }
}
