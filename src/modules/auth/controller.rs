use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use learnhub_core::AppError;
use learnhub_models::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RegisterRequest, TokenResponse,
    UserResponse,
};

use super::cookie::{removal_cookie, session_cookie};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.credentials.register(request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let response = state
        .sessions
        .login(&request.email, &request.password)
        .await?;

    let cookie = session_cookie(
        &state.cookie_config,
        response.access_token.clone(),
        response.expires_in,
    );
    Ok((jar.add(cookie), Json(response)))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let response = state.sessions.refresh(&request.refresh_token).await?;

    let cookie = session_cookie(
        &state.cookie_config,
        response.access_token.clone(),
        response.expires_in,
    );
    Ok((jar.add(cookie), Json(response)))
}

/// Always succeeds. Refresh tokens are revoked only for a verified session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Option<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    state
        .sessions
        .logout(session.as_ref().map(|user| &user.0))
        .await?;

    Ok((
        jar.add(removal_cookie(&state.cookie_config)),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}
