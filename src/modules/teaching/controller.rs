use axum::Json;
use serde::Serialize;
use tracing::instrument;

use learnhub_core::AppError;
use learnhub_core::permissions::permissions_for_roles;
use learnhub_models::UserId;

use crate::middleware::auth::AuthUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingOverview {
    pub user_id: UserId,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Reachable by teachers and admins only. Roles come from the verified
/// token, so a role granted after login shows up on the next token.
#[instrument(skip_all)]
pub async fn get_overview(auth_user: AuthUser) -> Result<Json<TeachingOverview>, AppError> {
    let permissions = permissions_for_roles(auth_user.roles())
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Json(TeachingOverview {
        user_id: auth_user.user_id()?,
        roles: auth_user.roles().to_vec(),
        permissions,
    }))
}
