use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use learnhub_core::AppError;
use learnhub_models::{
    AssignmentResponse, CreateRoleDto, MessageResponse, RemovalResponse, Role, RoleAssignmentDto,
    RoleId, UpdateRoleDto, UserId,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::guard::{ADMIN_ONLY, ensure_self_or_roles};
use crate::state::AppState;
use crate::validator::ValidatedJson;

// ============ Role Definitions (admin) ============

#[instrument(skip(state))]
pub async fn get_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(state.roles.list_roles().await?))
}

#[instrument(skip(state))]
pub async fn get_role_by_id(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<Role>, AppError> {
    Ok(Json(state.roles.get_role_by_id(id).await?))
}

#[instrument(skip(state, dto))]
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    let role = state.roles.create_role(dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[instrument(skip(state, dto))]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<Role>, AppError> {
    if dto.name.is_none() && dto.description.is_none() {
        return Err(AppError::bad_request(anyhow!("Nothing to update")));
    }
    Ok(Json(state.roles.update_role(id, dto).await?))
}

#[instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.roles.delete_role(id).await?;
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}

#[instrument(skip(state))]
pub async fn get_role_users(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<Vec<UserId>>, AppError> {
    Ok(Json(state.roles.get_users_with_role(id).await?))
}

// ============ Assignments (admin) ============

#[instrument(skip(state))]
pub async fn assign_role_to_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RoleAssignmentDto>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let assigned = state
        .roles
        .assign_role_to_user(dto.user_id, dto.role_id)
        .await?;
    Ok(Json(AssignmentResponse { assigned }))
}

#[instrument(skip(state))]
pub async fn remove_role_from_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RoleAssignmentDto>,
) -> Result<Json<RemovalResponse>, AppError> {
    let removed = state
        .roles
        .remove_role_from_user(dto.user_id, dto.role_id)
        .await?;
    Ok(Json(RemovalResponse { removed }))
}

// ============ User Roles (self or admin) ============

#[instrument(skip(state, auth_user))]
pub async fn get_user_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Role>>, AppError> {
    ensure_self_or_roles(&auth_user, user_id, ADMIN_ONLY)?;
    Ok(Json(state.roles.get_user_roles(user_id).await?))
}
