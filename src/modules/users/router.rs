use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_current_user;

pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}
