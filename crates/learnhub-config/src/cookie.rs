use std::env;

use crate::environment::AppEnvironment;

pub const DEFAULT_COOKIE_NAME: &str = "auth_token";

/// Attributes of the http-only cookie carrying the access token.
///
/// `secure` follows the environment: browsers only accept `SameSite=None`
/// on secure cookies, so development falls back to `Lax` over plain http.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
}

impl CookieConfig {
    pub fn from_env(environment: AppEnvironment) -> Self {
        Self {
            name: env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
            path: "/".to_string(),
            secure: environment.is_production(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            secure: false,
        }
    }
}
