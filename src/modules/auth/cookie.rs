//! Auth cookie lifecycle.
//!
//! The access token travels in an http-only cookie scoped to the configured
//! path. Its `Max-Age` equals the access token lifetime, so the cookie and
//! the token it carries expire together.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use learnhub_config::CookieConfig;

/// Cookie carrying a freshly minted access token.
pub fn session_cookie(config: &CookieConfig, token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token))
        .http_only(true)
        .path(config.path.clone())
        .max_age(Duration::seconds(max_age_secs))
        .same_site(same_site(config))
        .secure(config.secure)
        .build()
}

/// Cookie that makes the browser drop the auth cookie.
pub fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), ""))
        .http_only(true)
        .path(config.path.clone())
        .max_age(Duration::ZERO)
        .same_site(same_site(config))
        .secure(config.secure)
        .build()
}

// Browsers reject SameSite=None without Secure.
fn same_site(config: &CookieConfig) -> SameSite {
    if config.secure {
        SameSite::None
    } else {
        SameSite::Lax
    }
}
