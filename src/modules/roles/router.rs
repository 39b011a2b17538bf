use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_role_to_user, create_role, delete_role, get_role_by_id, get_role_users, get_roles,
    get_user_roles, remove_role_from_user, update_role,
};

/// Role administration. Mounted behind the admin gate.
pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route(
            "/{id}",
            get(get_role_by_id).put(update_role).delete(delete_role),
        )
        .route("/{id}/users", get(get_role_users))
        // Assignments
        .route("/assign", post(assign_role_to_user))
        .route("/remove", post(remove_role_from_user))
}

/// Checks ownership itself, so it is merged outside the admin gate.
pub fn init_user_roles_router() -> Router<AppState> {
    Router::new().route("/user/{user_id}", get(get_user_roles))
}
