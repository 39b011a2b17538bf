use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Deployment environment, read from `APP_ENV` (default: development).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("APP_ENV") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!(
            "production".parse::<AppEnvironment>().unwrap(),
            AppEnvironment::Production
        );
        assert_eq!(
            "Dev".parse::<AppEnvironment>().unwrap(),
            AppEnvironment::Development
        );
        assert!("staging".parse::<AppEnvironment>().is_err());
    }
}
