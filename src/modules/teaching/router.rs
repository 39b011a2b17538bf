use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_overview;

/// Mounted behind the teacher-or-admin gate.
pub fn init_teaching_router() -> Router<AppState> {
    Router::new().route("/overview", get(get_overview))
}
