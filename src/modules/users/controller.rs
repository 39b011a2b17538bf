use axum::{Json, extract::State};
use tracing::instrument;

use learnhub_core::AppError;
use learnhub_models::{CurrentUserResponse, UserResponse};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let user = state.credentials.get_user(user_id).await?;
    let roles = state.roles.get_user_role_names(user_id).await?;
    let permissions = state.roles.get_user_permissions(user_id).await?;

    Ok(Json(CurrentUserResponse {
        user: UserResponse::from(user),
        roles,
        permissions,
    }))
}
