//! Access token claims.
//!
//! Two payload shapes exist on the wire:
//!
//! - current: `{ "sub": "7", "roles": ["teacher"], "iat": .., "exp": .. }`
//! - legacy:  `{ "sub": "7", "role": "admin", "iat": .., "exp": .. }`
//!
//! Both deserialize through [`RawClaims`] and are resolved once, via
//! [`ClaimShape`], into the canonical [`AccessClaims`]. Nothing past the
//! decoder ever sees the legacy field.

use serde::{Deserialize, Serialize};

use learnhub_models::{RoleName, UserId};

/// Canonical access token claims. Always carries at least one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct AccessClaims {
    /// User id, in string form
    pub sub: String,
    /// Role names, in assignment order
    pub roles: Vec<String>,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Numeric user id carried in `sub`, if it is one.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    /// OR semantics: true when any held role is in `allowed`.
    pub fn has_any_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        self.roles
            .iter()
            .any(|held| allowed.iter().any(|a| a.as_ref() == held))
    }
}

/// Claims exactly as they appear in a token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

/// Where the role information of a payload came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimShape {
    Roles(Vec<String>),
    LegacyRole(String),
    Absent,
}

impl ClaimShape {
    /// `roles` wins over `role`. Empty values count as absent.
    pub fn detect(roles: Option<Vec<String>>, role: Option<String>) -> Self {
        match (roles, role) {
            (Some(roles), _) if !roles.is_empty() => ClaimShape::Roles(roles),
            (_, Some(role)) if !role.trim().is_empty() => ClaimShape::LegacyRole(role),
            _ => ClaimShape::Absent,
        }
    }

    pub fn into_roles(self) -> Vec<String> {
        match self {
            ClaimShape::Roles(roles) => roles,
            ClaimShape::LegacyRole(role) => vec![role],
            ClaimShape::Absent => vec![RoleName::BASE.as_str().to_string()],
        }
    }
}

impl From<RawClaims> for AccessClaims {
    fn from(raw: RawClaims) -> Self {
        Self {
            sub: raw.sub,
            roles: ClaimShape::detect(raw.roles, raw.role).into_roles(),
            iat: raw.iat,
            exp: raw.exp,
        }
    }
}
