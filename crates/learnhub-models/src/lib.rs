//! # LearnHub Models
//!
//! Domain models and DTOs for the LearnHub API.
//!
//! # Modules
//!
//! - [`auth`]: Login, refresh and logout payloads, refresh token records
//! - [`ids`]: Strongly-typed numeric identifiers
//! - [`roles`]: Role names, the predefined/custom role variant, assignment DTOs
//! - [`users`]: User records and registration/profile DTOs
//!
//! # Example
//!
//! ```ignore
//! use learnhub_models::roles::{Role, RoleName, RoleRecord};
//!
//! let role = Role::from(record);
//! if role.is_predefined() {
//!     println!("{} cannot be deleted", role.name());
//! }
//! ```

pub mod auth;
pub mod ids;
pub mod roles;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshTokenRecord,
    TokenResponse,
};
pub use ids::{RoleId, UserId};
pub use roles::{
    AssignmentResponse, CreateRoleDto, RemovalResponse, Role, RoleAssignmentDto, RoleName,
    RoleRecord, RoleRuleViolation, UnknownRoleName, UpdateRoleDto,
};
pub use users::{CurrentUserResponse, NewUser, RegisterRequest, UserRecord, UserResponse};
