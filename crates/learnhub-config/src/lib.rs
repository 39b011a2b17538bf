//! # LearnHub Config
//!
//! Configuration types for the LearnHub API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`environment`]: Deployment environment (development / production)
//! - [`jwt`]: Token signing configuration with a fail-closed secret policy
//! - [`cookie`]: Auth cookie attributes
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: Connection pool sizing and timeouts
//! - [`server`]: Listen address and request deadline
//!
//! # Example
//!
//! ```ignore
//! use learnhub_config::AppConfig;
//!
//! // Fails in production when JWT_SECRET is missing
//! let config = AppConfig::from_env()?;
//! ```

pub mod cookie;
pub mod cors;
pub mod database;
pub mod environment;
pub mod error;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cookie::CookieConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use environment::AppEnvironment;
pub use error::ConfigError;
pub use jwt::{JwtConfig, SecretSource};
pub use server::ServerConfig;

use std::ops::RangeInclusive;

pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Work factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Every configuration section the server needs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// bcrypt work factor for new password hashes (`BCRYPT_COST`, default 12)
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = AppEnvironment::from_env()?;

        Ok(Self {
            jwt: JwtConfig::from_env(environment)?,
            cookie: CookieConfig::from_env(environment),
            cors: CorsConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env(),
            bcrypt_cost: bcrypt_cost_from_env()?,
            environment,
        })
    }

    /// Warnings found while loading, for logging once the subscriber is up.
    pub fn warnings(&self) -> Vec<&'static str> {
        self.jwt.warning().into_iter().collect()
    }
}

/// `BCRYPT_COST`, falling back to [`DEFAULT_BCRYPT_COST`] when unset.
pub fn bcrypt_cost_from_env() -> Result<u32, ConfigError> {
    parse_bcrypt_cost(std::env::var("BCRYPT_COST").ok())
}

pub fn parse_bcrypt_cost(raw: Option<String>) -> Result<u32, ConfigError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(DEFAULT_BCRYPT_COST);
    };

    match raw.trim().parse::<u32>() {
        Ok(cost) if BCRYPT_COST_RANGE.contains(&cost) => Ok(cost),
        _ => Err(ConfigError::Invalid {
            name: "BCRYPT_COST",
            reason: format!(
                "expected an integer in {}..={}, got '{}'",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                raw
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_cost_defaults_when_unset() {
        assert_eq!(parse_bcrypt_cost(None).unwrap(), DEFAULT_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some("".into())).unwrap(), DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn test_bcrypt_cost_accepts_supported_range() {
        assert_eq!(parse_bcrypt_cost(Some("4".into())).unwrap(), 4);
        assert_eq!(parse_bcrypt_cost(Some(" 31 ".into())).unwrap(), 31);
    }

    #[test]
    fn test_bcrypt_cost_rejects_out_of_range_and_garbage() {
        for raw in ["3", "32", "0", "-1", "twelve"] {
            let err = parse_bcrypt_cost(Some(raw.into())).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "BCRYPT_COST", .. }));
        }
    }

    #[test]
    fn test_warnings_report_generated_secret() {
        let mut config = AppConfig {
            environment: AppEnvironment::Development,
            jwt: JwtConfig::with_secret("configured"),
            cookie: CookieConfig::default(),
            cors: CorsConfig::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        };
        assert!(config.warnings().is_empty());

        config.jwt.secret_source = SecretSource::Generated;
        assert_eq!(config.warnings().len(), 1);
    }
}
