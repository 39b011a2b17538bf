//! Token signing configuration.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: HMAC signing secret. Required in production (at least
//!   32 bytes). In development a random per-process secret is generated when
//!   unset, so tokens never verify across restarts.
//! - `JWT_ACCESS_EXPIRY`: Access token lifetime in seconds (default: 900).
//!   The auth cookie uses the same value as its `Max-Age`.
//! - `JWT_REFRESH_EXPIRY`: Refresh token lifetime in seconds (default: 604800).
//!
//! Lifetimes must be positive integers. Anything else fails startup.

use std::env;
use std::fmt;

use rand::RngCore;

use crate::environment::AppEnvironment;
use crate::error::ConfigError;

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900; // 15 minutes
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800; // 7 days
pub const MIN_SECRET_LEN: usize = 32;

/// Where the signing secret came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    /// Random per-process secret, development only.
    Generated,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub secret_source: SecretSource,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let (secret, secret_source) = resolve_secret(env::var("JWT_SECRET").ok(), environment)?;

        Ok(Self {
            secret,
            secret_source,
            access_token_expiry: parse_lifetime(
                "JWT_ACCESS_EXPIRY",
                env::var("JWT_ACCESS_EXPIRY").ok(),
                DEFAULT_ACCESS_TOKEN_EXPIRY,
            )?,
            refresh_token_expiry: parse_lifetime(
                "JWT_REFRESH_EXPIRY",
                env::var("JWT_REFRESH_EXPIRY").ok(),
                DEFAULT_REFRESH_TOKEN_EXPIRY,
            )?,
        })
    }

    /// Config with the default lifetimes and the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            secret_source: SecretSource::Environment,
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }

    /// Startup warning to log once the subscriber is up, if any.
    pub fn warning(&self) -> Option<&'static str> {
        match self.secret_source {
            SecretSource::Generated => Some(
                "JWT_SECRET is not set; using a random development secret (tokens will not survive a restart)",
            ),
            SecretSource::Environment => None,
        }
    }
}

/// Token lifetime in seconds. Unset or blank falls back to `default`.
pub fn parse_lifetime(
    name: &'static str,
    raw: Option<String>,
    default: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a positive number of seconds, got '{}'", raw),
        }),
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("secret_source", &self.secret_source)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Applies the fail-closed secret policy.
///
/// Production refuses to start without a strong secret. Development falls
/// back to an unguessable random secret instead of a well-known constant.
pub fn resolve_secret(
    raw: Option<String>,
    environment: AppEnvironment,
) -> Result<(String, SecretSource), ConfigError> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(secret) if environment.is_production() && secret.len() < MIN_SECRET_LEN => {
            Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} bytes in production", MIN_SECRET_LEN),
            })
        }
        Some(secret) => Ok((secret, SecretSource::Environment)),
        None if environment.is_production() => Err(ConfigError::Missing("JWT_SECRET")),
        None => Ok((generate_secret(), SecretSource::Generated)),
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_requires_secret() {
        let result = resolve_secret(None, AppEnvironment::Production);
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn test_production_rejects_blank_secret() {
        let result = resolve_secret(Some("   ".to_string()), AppEnvironment::Production);
        assert!(result.is_err());
    }

    #[test]
    fn test_production_rejects_short_secret() {
        let result = resolve_secret(Some("short".to_string()), AppEnvironment::Production);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_production_accepts_strong_secret() {
        let secret = "a".repeat(MIN_SECRET_LEN);
        let result = resolve_secret(Some(secret.clone()), AppEnvironment::Production).unwrap();
        assert_eq!(result, (secret, SecretSource::Environment));
    }

    #[test]
    fn test_development_generates_random_secret() {
        let (first, source) = resolve_secret(None, AppEnvironment::Development).unwrap();
        let (second, _) = resolve_secret(None, AppEnvironment::Development).unwrap();

        assert_eq!(source, SecretSource::Generated);
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
    }

    #[test]
    fn test_development_keeps_provided_secret() {
        let result = resolve_secret(Some("dev".to_string()), AppEnvironment::Development).unwrap();
        assert_eq!(result, ("dev".to_string(), SecretSource::Environment));
    }

    #[test]
    fn test_generated_secret_is_reported_as_warning() {
        let (secret, secret_source) = resolve_secret(None, AppEnvironment::Development).unwrap();
        let config = JwtConfig {
            secret,
            secret_source,
            ..JwtConfig::with_secret("")
        };
        assert!(config.warning().unwrap().contains("JWT_SECRET"));

        assert!(JwtConfig::with_secret("configured").warning().is_none());
    }

    #[test]
    fn test_lifetime_defaults_when_unset() {
        assert_eq!(parse_lifetime("JWT_ACCESS_EXPIRY", None, 900).unwrap(), 900);
        assert_eq!(parse_lifetime("JWT_ACCESS_EXPIRY", Some(" ".into()), 900).unwrap(), 900);
        assert_eq!(parse_lifetime("JWT_ACCESS_EXPIRY", Some("60".into()), 900).unwrap(), 60);
    }

    #[test]
    fn test_lifetime_rejects_non_positive_and_garbage() {
        for raw in ["0", "-5", "15m", "1.5"] {
            let err = parse_lifetime("JWT_REFRESH_EXPIRY", Some(raw.into()), 604_800).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "JWT_REFRESH_EXPIRY", .. }));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::with_secret("super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("<redacted>"));
    }
}
