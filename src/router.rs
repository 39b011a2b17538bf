use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::logging::logging_middleware;
use crate::middleware::guard::{require_admin, require_teacher_or_admin};
use crate::modules::auth::router::init_auth_router;
use crate::modules::roles::router::{init_roles_router, init_user_roles_router};
use crate::modules::teaching::router::init_teaching_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/users", init_users_router())
                .nest(
                    "/roles",
                    init_roles_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
                        .merge(init_user_roles_router()),
                )
                .nest(
                    "/teaching",
                    init_teaching_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_teacher_or_admin,
                    )),
                ),
        )
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.server_config.request_timeout))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
