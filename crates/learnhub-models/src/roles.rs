//! Role domain models and DTOs.
//!
//! Role names come from a closed enumeration ([`RoleName`]). Rows whose name
//! is one of those five are *predefined*: the permission table depends on
//! them, so they cannot be renamed or deleted. Any other row is a *custom*
//! role and is fully mutable. [`Role`] encodes that split in its variants so
//! the rename and delete rules are enforced by a `match` rather than by
//! comparing strings at each call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use validator::Validate;

use crate::ids::{RoleId, UserId};

/// The closed set of valid role names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    User,
    Admin,
    Teacher,
    ContentCreator,
    Moderator,
}

impl RoleName {
    pub const ALL: [RoleName; 5] = [
        RoleName::User,
        RoleName::Admin,
        RoleName::Teacher,
        RoleName::ContentCreator,
        RoleName::Moderator,
    ];

    /// Role granted when nothing else is: new registrations, empty tokens.
    pub const BASE: RoleName = RoleName::User;

    pub const fn as_str(self) -> &'static str {
        match self {
            RoleName::User => "user",
            RoleName::Admin => "admin",
            RoleName::Teacher => "teacher",
            RoleName::ContentCreator => "content_creator",
            RoleName::Moderator => "moderator",
        }
    }

    /// Description written when the role is seeded.
    pub const fn default_description(self) -> &'static str {
        match self {
            RoleName::User => "Standard user with basic permissions",
            RoleName::Admin => "Administrator with full system access",
            RoleName::Teacher => "Teacher with course management capabilities",
            RoleName::ContentCreator => "Can create and manage premium content",
            RoleName::Moderator => "Can moderate user content and comments",
        }
    }

    pub fn permissions(self) -> &'static [&'static str] {
        learnhub_core::permissions::permissions_for_role(self.as_str())
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid role name: {0}")]
pub struct UnknownRoleName(pub String);

impl FromStr for RoleName {
    type Err = UnknownRoleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownRoleName(s.to_string()))
    }
}

/// A row of the `roles` table as stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
}

/// Why a role mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleRuleViolation {
    #[error("Cannot delete a predefined role")]
    DeletePredefined,

    #[error("Cannot change the name of a predefined role")]
    RenamePredefined,

    #[error(transparent)]
    InvalidName(#[from] UnknownRoleName),
}

/// A role, classified as predefined or custom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RoleView")]
pub enum Role {
    Predefined {
        id: RoleId,
        name: RoleName,
        description: Option<String>,
    },
    Custom {
        id: RoleId,
        name: String,
        description: Option<String>,
    },
}

impl Role {
    pub fn id(&self) -> RoleId {
        match self {
            Role::Predefined { id, .. } | Role::Custom { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Role::Predefined { name, .. } => name.as_str(),
            Role::Custom { name, .. } => name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Role::Predefined { description, .. } | Role::Custom { description, .. } => {
                description.as_deref()
            }
        }
    }

    pub fn is_predefined(&self) -> bool {
        matches!(self, Role::Predefined { .. })
    }

    /// Predefined roles are never deletable, regardless of assignments.
    pub fn ensure_deletable(&self) -> Result<(), RoleRuleViolation> {
        match self {
            Role::Predefined { .. } => Err(RoleRuleViolation::DeletePredefined),
            Role::Custom { .. } => Ok(()),
        }
    }

    /// Validates a requested new name.
    ///
    /// A predefined role may only be "renamed" to its current name. Any role
    /// may only carry a name from the valid enumeration.
    pub fn ensure_renamable(&self, new_name: &str) -> Result<RoleName, RoleRuleViolation> {
        match self {
            Role::Predefined { name, .. } if name.as_str() == new_name => Ok(*name),
            Role::Predefined { .. } => Err(RoleRuleViolation::RenamePredefined),
            Role::Custom { .. } => Ok(new_name.parse()?),
        }
    }
}

impl From<RoleRecord> for Role {
    fn from(record: RoleRecord) -> Self {
        match record.name.parse::<RoleName>() {
            Ok(name) => Role::Predefined {
                id: record.id,
                name,
                description: record.description,
            },
            Err(_) => Role::Custom {
                id: record.id,
                name: record.name,
                description: record.description,
            },
        }
    }
}

/// Wire shape of a role.
#[derive(Debug, Clone, Serialize)]
pub struct RoleView {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub predefined: bool,
}

impl From<Role> for RoleView {
    fn from(role: Role) -> Self {
        Self {
            id: role.id(),
            name: role.name().to_string(),
            description: role.description().map(str::to_string),
            predefined: role.is_predefined(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoleDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentDto {
    pub user_id: UserId,
    pub role_id: RoleId,
}

/// `assigned: false` means the user already held the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub assigned: bool,
}

/// `removed: false` means the user did not hold the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalResponse {
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str) -> RoleRecord {
        RoleRecord {
            id: RoleId::new(id),
            name: name.to_string(),
            description: Some("desc".to_string()),
        }
    }

    #[test]
    fn test_role_name_round_trips_through_str() {
        for name in RoleName::ALL {
            assert_eq!(name.as_str().parse::<RoleName>().unwrap(), name);
        }
        assert_eq!(
            "superadmin".parse::<RoleName>(),
            Err(UnknownRoleName("superadmin".to_string()))
        );
    }

    #[test]
    fn test_role_name_serde_uses_snake_case() {
        let json = serde_json::to_string(&RoleName::ContentCreator).unwrap();
        assert_eq!(json, r#""content_creator""#);
    }

    #[test]
    fn test_record_classification() {
        assert!(Role::from(record(1, "admin")).is_predefined());
        assert!(!Role::from(record(9, "legacy_reviewer")).is_predefined());
    }

    #[test]
    fn test_predefined_role_cannot_be_deleted() {
        let admin = Role::from(record(1, "admin"));
        assert_eq!(
            admin.ensure_deletable(),
            Err(RoleRuleViolation::DeletePredefined)
        );

        let custom = Role::from(record(9, "legacy_reviewer"));
        assert!(custom.ensure_deletable().is_ok());
    }

    #[test]
    fn test_predefined_role_cannot_be_renamed() {
        let admin = Role::from(record(1, "admin"));
        assert_eq!(
            admin.ensure_renamable("superadmin"),
            Err(RoleRuleViolation::RenamePredefined)
        );
        assert_eq!(admin.ensure_renamable("teacher"), Err(RoleRuleViolation::RenamePredefined));
        assert_eq!(admin.ensure_renamable("admin"), Ok(RoleName::Admin));
    }

    #[test]
    fn test_custom_role_rename_requires_valid_name() {
        let custom = Role::from(record(9, "legacy_reviewer"));
        assert_eq!(custom.ensure_renamable("moderator"), Ok(RoleName::Moderator));
        assert!(matches!(
            custom.ensure_renamable("reviewer"),
            Err(RoleRuleViolation::InvalidName(_))
        ));
    }

    #[test]
    fn test_role_serializes_as_view() {
        let json = serde_json::to_value(Role::from(record(2, "teacher"))).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "teacher");
        assert_eq!(json["predefined"], true);
    }

    #[test]
    fn test_assignment_dto_uses_camel_case() {
        let dto: RoleAssignmentDto = serde_json::from_str(r#"{"userId":3,"roleId":4}"#).unwrap();
        assert_eq!(dto.user_id, UserId::new(3));
        assert_eq!(dto.role_id, RoleId::new(4));
    }

    #[test]
    fn test_base_role_permissions() {
        assert!(RoleName::BASE.permissions().contains(&"read:own_profile"));
        assert!(!RoleName::BASE.permissions().contains(&"delete:user"));
    }
}
