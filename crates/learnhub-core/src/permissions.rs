//! Permission constants and the static role → permission table.
//!
//! Permissions are never stored. A user's permissions are the union of the
//! permissions of every role they hold, computed on demand from
//! [`permissions_for_role`]. Role names that are not in the table grant
//! nothing.
//!
//! # Example
//!
//! ```ignore
//! use learnhub_core::permissions;
//!
//! let granted = permissions::permissions_for_roles(&["teacher", "moderator"]);
//! assert!(granted.contains(&permissions::GRADE_STUDENTS));
//! assert!(granted.contains(&permissions::MODERATE_COMMENTS));
//! ```

use std::collections::BTreeSet;

// =============================================================================
// Profile permissions
// =============================================================================

/// Permission to read one's own profile
pub const READ_OWN_PROFILE: &str = "read:own_profile";
/// Permission to update one's own profile
pub const UPDATE_OWN_PROFILE: &str = "update:own_profile";

// =============================================================================
// Content permissions
// =============================================================================

/// Permission to read public content
pub const READ_PUBLIC_CONTENT: &str = "read:public_content";
/// Permission to create one's own content
pub const CREATE_OWN_CONTENT: &str = "create:own_content";
/// Permission to update one's own content
pub const UPDATE_OWN_CONTENT: &str = "update:own_content";
/// Permission to delete one's own content
pub const DELETE_OWN_CONTENT: &str = "delete:own_content";

// =============================================================================
// Admin permissions
// =============================================================================

/// Permission to list every user
pub const READ_ALL_USERS: &str = "read:all_users";
/// Permission to create users on behalf of others
pub const CREATE_USER: &str = "create:user";
/// Permission to update any user
pub const UPDATE_ANY_USER: &str = "update:any_user";
/// Permission to delete users
pub const DELETE_USER: &str = "delete:user";
/// Permission to update platform information (terms, legal mentions)
pub const UPDATE_SYSTEM_INFO: &str = "update:system_info";

// =============================================================================
// Teacher permissions
// =============================================================================

/// Permission to create courses
pub const CREATE_COURSE: &str = "create:course";
/// Permission to grade students
pub const GRADE_STUDENTS: &str = "grade:students";

// =============================================================================
// Content creator permissions
// =============================================================================

/// Permission to create premium content
pub const CREATE_PREMIUM_CONTENT: &str = "create:premium_content";

// =============================================================================
// Moderator permissions
// =============================================================================

/// Permission to moderate content
pub const MODERATE_CONTENT: &str = "moderate:content";
/// Permission to moderate comments
pub const MODERATE_COMMENTS: &str = "moderate:comments";

const BASE: [&str; 6] = [
    READ_OWN_PROFILE,
    UPDATE_OWN_PROFILE,
    READ_PUBLIC_CONTENT,
    CREATE_OWN_CONTENT,
    UPDATE_OWN_CONTENT,
    DELETE_OWN_CONTENT,
];

const USER: &[&str] = &BASE;

const ADMIN: &[&str] = &[
    READ_OWN_PROFILE,
    UPDATE_OWN_PROFILE,
    READ_PUBLIC_CONTENT,
    CREATE_OWN_CONTENT,
    UPDATE_OWN_CONTENT,
    DELETE_OWN_CONTENT,
    READ_ALL_USERS,
    CREATE_USER,
    UPDATE_ANY_USER,
    DELETE_USER,
    UPDATE_SYSTEM_INFO,
    MODERATE_CONTENT,
    MODERATE_COMMENTS,
];

const TEACHER: &[&str] = &[
    READ_OWN_PROFILE,
    UPDATE_OWN_PROFILE,
    READ_PUBLIC_CONTENT,
    CREATE_OWN_CONTENT,
    UPDATE_OWN_CONTENT,
    DELETE_OWN_CONTENT,
    CREATE_COURSE,
    GRADE_STUDENTS,
];

const CONTENT_CREATOR: &[&str] = &[
    READ_OWN_PROFILE,
    UPDATE_OWN_PROFILE,
    READ_PUBLIC_CONTENT,
    CREATE_OWN_CONTENT,
    UPDATE_OWN_CONTENT,
    DELETE_OWN_CONTENT,
    CREATE_PREMIUM_CONTENT,
];

const MODERATOR: &[&str] = &[
    READ_OWN_PROFILE,
    UPDATE_OWN_PROFILE,
    READ_PUBLIC_CONTENT,
    CREATE_OWN_CONTENT,
    UPDATE_OWN_CONTENT,
    DELETE_OWN_CONTENT,
    MODERATE_CONTENT,
    MODERATE_COMMENTS,
];

/// Returns the fixed permission set of a role name, empty for unknown names.
pub fn permissions_for_role(role: &str) -> &'static [&'static str] {
    match role {
        "user" => USER,
        "admin" => ADMIN,
        "teacher" => TEACHER,
        "content_creator" => CONTENT_CREATOR,
        "moderator" => MODERATOR,
        _ => &[],
    }
}

/// Union of the permissions of every given role, deduplicated and sorted.
pub fn permissions_for_roles<S: AsRef<str>>(roles: &[S]) -> Vec<&'static str> {
    roles
        .iter()
        .flat_map(|role| permissions_for_role(role.as_ref()).iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Whether any of the given roles grants `permission`. No role, no permission.
pub fn roles_grant<S: AsRef<str>>(roles: &[S], permission: &str) -> bool {
    roles
        .iter()
        .any(|role| permissions_for_role(role.as_ref()).contains(&permission))
}
