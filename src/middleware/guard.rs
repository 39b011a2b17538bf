//! Role gates.
//!
//! Every role-gated route runs two checks, in order:
//!
//! 1. [`guard_roles`], a precheck that decodes the token payload *without*
//!    verifying its signature and rejects requests whose claimed roles can
//!    never pass. It only saves the cost of verification on obviously
//!    unauthorized requests.
//! 2. [`require_auth`], which verifies the token. The role allow-list is
//!    then checked again against the verified claims.
//!
//! A forged token with a favorable `roles` claim passes step 1 and is
//! rejected by step 2. The precheck is never used on its own.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware};
//! use crate::middleware::guard::require_admin;
//!
//! let admin_routes = Router::new()
//!     .route("/roles", get(list_roles))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use learnhub_auth::JwtCodec;
use learnhub_core::AppError;
use learnhub_models::{RoleName, UserId};

use crate::middleware::auth::{AuthUser, extract_tokens, require_auth};
use crate::state::AppState;

pub const ADMIN_ONLY: &[RoleName] = &[RoleName::Admin];
pub const TEACHING_STAFF: &[RoleName] = &[RoleName::Teacher, RoleName::Admin];

/// Unverified role precheck.
///
/// Returns the rejection to send, or `None` when the request may proceed to
/// authoritative verification. `None` proves nothing about the caller.
pub fn guard_roles(
    codec: &JwtCodec,
    token: Option<&str>,
    allowed: &[RoleName],
) -> Option<AppError> {
    let Some(token) = token else {
        return Some(AppError::unauthorized("Authentication required"));
    };

    let Some(claims) = codec.peek(token) else {
        return Some(AppError::unauthorized("Invalid token"));
    };

    if claims.has_any_role(allowed) {
        None
    } else {
        Some(insufficient_role())
    }
}

/// Runs [`guard_roles`] over every candidate token. Passes when any of them
/// passes, otherwise returns the rejection of the first.
fn guard_any(codec: &JwtCodec, tokens: &[String], allowed: &[RoleName]) -> Option<AppError> {
    if tokens.is_empty() {
        return guard_roles(codec, None, allowed);
    }

    let mut first_rejection = None;
    for token in tokens {
        match guard_roles(codec, Some(token), allowed) {
            None => return None,
            Some(rejection) => {
                first_rejection.get_or_insert(rejection);
            }
        }
    }
    first_rejection
}

/// Precheck, then verify, then re-check the verified roles.
///
/// On success the verified [`AuthUser`] is stored in the request extensions
/// so handlers extracting it do not verify twice.
pub async fn require_roles(
    state: &AppState,
    mut req: Request,
    next: Next,
    allowed: &[RoleName],
) -> Result<Response, AppError> {
    let tokens = extract_tokens(req.headers(), &state.cookie_config.name);

    if let Some(rejection) = guard_any(state.tokens.codec(), &tokens, allowed) {
        warn!(
            path = %req.uri().path(),
            status = %rejection.status.as_u16(),
            "Role precheck rejected request"
        );
        return Err(rejection);
    }

    let user = require_auth(req.headers(), state)?;
    if !user.has_any_role(allowed) {
        warn!(
            path = %req.uri().path(),
            sub = %user.0.sub,
            "Verified roles do not satisfy the allow-list"
        );
        return Err(insufficient_role());
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, ADMIN_ONLY).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_teacher_or_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(&state, req, next, TEACHING_STAFF).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Owners of a resource bypass the role gate; everyone else needs one of
/// `allowed`.
pub fn ensure_self_or_roles(
    user: &AuthUser,
    owner: UserId,
    allowed: &[RoleName],
) -> Result<(), AppError> {
    if user.has_any_role(allowed) {
        return Ok(());
    }

    match user.0.user_id() {
        Some(id) if id == owner => Ok(()),
        _ => Err(insufficient_role()),
    }
}

fn insufficient_role() -> AppError {
    AppError::forbidden("Insufficient role")
}
