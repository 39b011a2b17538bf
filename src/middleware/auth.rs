use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use learnhub_auth::AccessClaims;
use learnhub_core::AppError;
use learnhub_models::UserId;

use crate::state::AppState;

/// Access tokens carried by the request, auth cookie first, then an
/// `Authorization: Bearer` header. An empty cookie is ignored and a header
/// repeating the cookie value is listed once.
pub fn extract_tokens(headers: &HeaderMap, cookie_name: &str) -> Vec<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());
    let from_header = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    let mut tokens: Vec<String> = from_cookie.into_iter().collect();
    if let Some(token) = from_header {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Authoritatively verified caller.
///
/// Extracting it verifies the token signature and expiry. It is the only
/// identity a handler may trust.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn roles(&self) -> &[String] {
        &self.0.roles
    }

    pub fn has_any_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        self.0.has_any_role(allowed)
    }
}

/// Verifies the request's token. Fails with 401 when it is missing, forged
/// or expired.
///
/// The cookie wins when it verifies. A cookie that fails verification does
/// not shadow a valid Bearer header; when neither verifies the cookie's
/// error is returned.
pub fn require_auth(headers: &HeaderMap, state: &AppState) -> Result<AuthUser, AppError> {
    let mut first_error = None;

    for token in extract_tokens(headers, &state.cookie_config.name) {
        match state.tokens.verify_access_token(&token) {
            Ok(claims) => return Ok(AuthUser(claims)),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    Err(first_error.unwrap_or_else(|| AppError::unauthorized("Authentication required")))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by a role layer on this route
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        require_auth(&parts.headers, state)
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_extract_token_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; auth_token=from-cookie".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());

        assert_eq!(extract_tokens(&headers, "auth_token")[0], "from-cookie");
    }

    #[test]
    fn test_extract_token_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());

        assert_eq!(extract_tokens(&headers, "auth_token"), vec!["from-header"]);
    }

    #[test]
    fn test_extract_token_ignores_cleared_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "auth_token=".parse().unwrap());
        assert!(extract_tokens(&headers, "auth_token").is_empty());
    }

    #[test]
    fn test_extract_tokens_lists_cookie_then_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "auth_token=stale".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer fresh".parse().unwrap());
        assert_eq!(extract_tokens(&headers, "auth_token"), vec!["stale", "fresh"]);

        headers.insert(header::AUTHORIZATION, "Bearer stale".parse().unwrap());
        assert_eq!(extract_tokens(&headers, "auth_token"), vec!["stale"]);
    }

    #[test]
    fn test_extract_token_missing() {
        assert!(extract_tokens(&HeaderMap::new(), "auth_token").is_empty());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(extract_tokens(&headers, "auth_token").is_empty());
    }

    #[test]
    fn test_auth_user_id_parses_subject() {
        let user = AuthUser(AccessClaims {
            sub: "12".to_string(),
            roles: vec!["user".to_string()],
            iat: 0,
            exp: 0,
        });
        assert_eq!(user.user_id().unwrap(), UserId::new(12));

        let bad = AuthUser(AccessClaims {
            sub: "a@x.com".to_string(),
            ..user.0
        });
        assert!(bad.user_id().unwrap_err().is_unauthorized());
    }
}
