//! Signing and verification of access tokens.
//!
//! [`JwtCodec`] is built once from [`JwtConfig`] and shared through the
//! application state. It offers two decoders with different trust levels:
//!
//! - [`JwtCodec::verify`] checks the HMAC signature and expiry. It is the
//!   only way to obtain claims that may gate a privileged action.
//! - [`JwtCodec::peek`] reads the payload without checking anything. It
//!   exists for the fast role precheck and must never stand in for `verify`.
//!
//! # Example
//!
//! ```ignore
//! use learnhub_auth::JwtCodec;
//! use learnhub_config::JwtConfig;
//!
//! let codec = JwtCodec::new(&JwtConfig::with_secret("secret"));
//! let token = codec.sign(user_id, vec!["teacher".to_string()])?;
//! let claims = codec.verify(&token)?;
//! assert_eq!(claims.roles, vec!["teacher"]);
//! ```

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use learnhub_config::JwtConfig;
use learnhub_core::AppError;
use learnhub_models::{RoleName, UserId};

use crate::claims::AccessClaims;

#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    verifying: Validation,
    peeking: Validation,
    access_token_expiry: i64,
}

impl JwtCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut verifying = Validation::new(Algorithm::HS256);
        verifying.set_required_spec_claims(&["exp", "sub"]);

        let mut peeking = Validation::new(Algorithm::HS256);
        peeking.insecure_disable_signature_validation();
        peeking.validate_exp = false;
        peeking.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            verifying,
            peeking,
            access_token_expiry: config.access_token_expiry,
        }
    }

    /// Lifetime of minted access tokens, in seconds.
    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    /// Mints an access token for `user_id`.
    ///
    /// An empty role list is replaced by the base role, so no token is ever
    /// issued with zero roles.
    pub fn sign(&self, user_id: UserId, roles: Vec<String>) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let roles = if roles.is_empty() {
            vec![RoleName::BASE.as_str().to_string()]
        } else {
            roles
        };

        self.sign_claims(&AccessClaims {
            sub: user_id.to_string(),
            roles,
            iat: now,
            exp: now + self.access_token_expiry,
        })
    }

    pub fn sign_claims(&self, claims: &AccessClaims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
    }

    /// Verifies signature and expiry and returns the normalized claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.decoding, &self.verifying)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized("Token expired"),
                _ => AppError::unauthorized("Invalid token"),
            })
    }

    /// Decodes the payload without verifying the signature or expiry.
    ///
    /// Returns `None` when the token is not structurally a JWT.
    pub fn peek(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding, &self.peeking)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn codec() -> JwtCodec {
        JwtCodec::new(&JwtConfig::with_secret(SECRET))
    }

    #[test]
    fn test_sign_then_verify_keeps_subject_and_roles() {
        let codec = codec();
        let roles = vec!["teacher".to_string(), "moderator".to_string()];
        let token = codec.sign(UserId::new(42), roles.clone()).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_sign_with_no_roles_embeds_base_role() {
        let codec = codec();
        let token = codec.sign(UserId::new(1), vec![]).unwrap();
        assert_eq!(codec.verify(&token).unwrap().roles, vec!["user"]);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = codec().sign(UserId::new(1), vec!["admin".into()]).unwrap();
        let other = JwtCodec::new(&JwtConfig::with_secret("a-completely-different-secret-value"));

        let err = other.verify(&token).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.error.to_string(), "Invalid token");
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = codec
            .sign_claims(&AccessClaims {
                sub: "1".to_string(),
                roles: vec!["user".to_string()],
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.error.to_string(), "Token expired");
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(codec().verify("not.a.token").unwrap_err().is_unauthorized());
        assert!(codec().verify("").unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_verify_normalizes_legacy_role_claim() {
        #[derive(serde::Serialize)]
        struct Legacy {
            sub: String,
            role: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &Legacy {
                sub: "7".to_string(),
                role: "admin".to_string(),
                iat: now,
                exp: now + 60,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let claims = codec().verify(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.roles, vec!["admin"]);
    }

    #[test]
    fn test_peek_reads_forged_and_expired_tokens() {
        let forger = JwtCodec::new(&JwtConfig::with_secret("attacker-controlled-secret-value!!"));
        let forged = forger.sign(UserId::new(9), vec!["admin".into()]).unwrap();

        let peeked = codec().peek(&forged).unwrap();
        assert_eq!(peeked.roles, vec!["admin"]);
        assert!(codec().verify(&forged).is_err());
    }

    #[test]
    fn test_peek_rejects_malformed_token() {
        assert!(codec().peek("garbage").is_none());
        assert!(codec().peek("a.b.c").is_none());
    }
}
