use std::sync::Arc;

use learnhub_config::{AppConfig, CookieConfig, CorsConfig, ServerConfig};
use learnhub_db::Store;

use crate::modules::auth::service::{SessionService, TokenService};
use crate::modules::roles::service::RoleService;
use crate::modules::users::service::CredentialService;

/// Shared application state.
///
/// Services are constructed once over a single [`Store`] and injected into
/// handlers through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    pub roles: RoleService,
    pub tokens: TokenService,
    pub sessions: SessionService,
    pub cookie_config: CookieConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        let roles = RoleService::new(store.clone());
        let credentials = CredentialService::new(store.clone(), roles.clone(), config.bcrypt_cost);
        let tokens = TokenService::new(store, &config.jwt);
        let sessions = SessionService::new(credentials.clone(), tokens.clone());

        Self {
            credentials,
            roles,
            tokens,
            sessions,
            cookie_config: config.cookie.clone(),
            cors_config: config.cors.clone(),
            server_config: config.server.clone(),
        }
    }
}
