use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

use learnhub_auth::{AccessClaims, JwtCodec, generate_refresh_token};
use learnhub_config::JwtConfig;
use learnhub_core::AppError;
use learnhub_db::Store;
use learnhub_models::{LoginResponse, RefreshTokenRecord, TokenResponse, UserId};

use crate::modules::users::service::CredentialService;

/// Mints and verifies access tokens, and manages stored refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn Store>,
    codec: Arc<JwtCodec>,
    refresh_token_expiry: i64,
}

impl TokenService {
    pub fn new(store: Arc<dyn Store>, config: &JwtConfig) -> Self {
        Self {
            store,
            codec: Arc::new(JwtCodec::new(config)),
            refresh_token_expiry: config.refresh_token_expiry,
        }
    }

    pub fn codec(&self) -> &JwtCodec {
        &self.codec
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.codec.access_token_expiry()
    }

    /// Embeds the user's current roles. A user without roles gets the base
    /// role in the token.
    #[instrument(skip(self))]
    pub async fn mint_access_token(&self, user_id: UserId) -> Result<String, AppError> {
        let roles = self
            .store
            .roles_of_user(user_id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        self.codec.sign(user_id, roles)
    }

    /// Generates a refresh token and stores it against `user_id`.
    #[instrument(skip(self))]
    pub async fn mint_refresh_token(&self, user_id: UserId) -> Result<String, AppError> {
        let record = RefreshTokenRecord {
            token: generate_refresh_token(),
            user_id,
            expires_at: Utc::now() + Duration::seconds(self.refresh_token_expiry),
        };
        self.store.insert_refresh_token(&record).await?;

        Ok(record.token)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.codec.verify(token)
    }

    /// Returns the owner of a live refresh token. An expired token is
    /// deleted before the error is returned.
    #[instrument(skip_all)]
    pub async fn verify_refresh_token(&self, token: &str) -> Result<UserId, AppError> {
        let record = self
            .store
            .find_refresh_token(token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if record.is_expired_at(Utc::now()) {
            self.store.delete_refresh_token(token).await?;
            warn!(user_id = %record.user_id, "Expired refresh token presented");
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        Ok(record.user_id)
    }

    /// Removes a refresh token and returns its owner. Only one caller can
    /// consume a given token; every other caller gets the same 401 as for an
    /// unknown token.
    #[instrument(skip_all)]
    pub async fn consume_refresh_token(&self, token: &str) -> Result<UserId, AppError> {
        let record = self
            .store
            .take_refresh_token(token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if record.is_expired_at(Utc::now()) {
            warn!(user_id = %record.user_id, "Expired refresh token presented");
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        Ok(record.user_id)
    }

    #[instrument(skip_all)]
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.store.delete_refresh_token(token).await?)
    }

    /// Deletes every refresh token of the user. Zero matches is fine.
    #[instrument(skip(self))]
    pub async fn revoke_all_refresh_tokens(&self, user_id: UserId) -> Result<u64, AppError> {
        Ok(self.store.delete_refresh_tokens_for_user(user_id).await?)
    }
}

/// Login, refresh and logout.
#[derive(Clone)]
pub struct SessionService {
    credentials: CredentialService,
    tokens: TokenService,
}

impl SessionService {
    pub fn new(credentials: CredentialService, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = self.credentials.authenticate(email, password).await?;

        let refresh_token = self.tokens.mint_refresh_token(user.id).await?;
        let access_token = self.tokens.mint_access_token(user.id).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            user_id: user.id,
            access_token,
            refresh_token,
            expires_in: self.tokens.access_token_expiry(),
        })
    }

    /// Exchanges a refresh token for a new pair. The presented token is
    /// consumed.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let user_id = self.tokens.consume_refresh_token(refresh_token).await?;

        let user = self.credentials.get_user(user_id).await.map_err(|e| {
            if e.is_not_found() {
                AppError::unauthorized("Invalid refresh token")
            } else {
                e
            }
        })?;

        let new_refresh_token = self.tokens.mint_refresh_token(user.id).await?;
        let access_token = self.tokens.mint_access_token(user.id).await?;

        info!(user_id = %user.id, "Session refreshed");
        Ok(TokenResponse {
            access_token,
            refresh_token: new_refresh_token,
            expires_in: self.tokens.access_token_expiry(),
        })
    }

    /// Revokes the refresh tokens of the verified session, if any.
    #[instrument(skip_all)]
    pub async fn logout(&self, session: Option<&AccessClaims>) -> Result<(), AppError> {
        let Some(user_id) = session.and_then(AccessClaims::user_id) else {
            return Ok(());
        };

        let revoked = self.tokens.revoke_all_refresh_tokens(user_id).await?;
        info!(user_id = %user_id, revoked, "User logged out");
        Ok(())
    }
}
