//! Runtime configuration from environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Secret used when `JWT_SECRET` is unset in development.
const DEV_JWT_SECRET: &str = "grimoire-development-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        };
        f.write_str(name)
    }
}

/// Credentials for the admin account created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Option<String>,
    pub resolution_cache_ttl: Duration,
    pub admin: Option<AdminBootstrap>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_url", &self.database_url)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("resolution_cache_ttl", &self.resolution_cache_ttl)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let env = match var("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => AppEnv::Development,
        };

        let server_host = var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let server_port = match var("SERVER_PORT").or_else(|| var("PORT")) {
            Some(raw) => parse_in_range::<u16>("SERVER_PORT", &raw, 1, u16::MAX)?,
            None => 3001,
        };

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite:grimoire.db?mode=rwc".into());

        let jwt_secret = match (var("JWT_SECRET"), env) {
            (Some(secret), _) => secret,
            (None, AppEnv::Production) => return Err(ConfigError::Missing { name: "JWT_SECRET" }),
            (None, _) => DEV_JWT_SECRET.to_string(),
        };

        let jwt_ttl_hours = match var("JWT_TTL_HOURS") {
            Some(raw) => parse_in_range::<u64>("JWT_TTL_HOURS", &raw, 1, 24 * 30)?,
            None => 12,
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(raw) => parse_in_range::<u32>("BCRYPT_COST", &raw, 4, 31)?,
            None => 12,
        };

        let resolution_cache_secs = match var("RESOLUTION_CACHE_TTL_SECS") {
            Some(raw) => parse_in_range::<u64>("RESOLUTION_CACHE_TTL_SECS", &raw, 0, 86_400)?,
            None => 60,
        };

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                let email = var("ADMIN_EMAIL").unwrap_or_else(|| format!("{}@localhost", username));
                Some(AdminBootstrap {
                    username,
                    email,
                    password,
                })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "ADMIN_USERNAME",
                    reason: "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".into(),
                })
            }
        };

        Ok(Self {
            env,
            server_host,
            server_port,
            database_url,
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl_hours * 3600),
            bcrypt_cost,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
            resolution_cache_ttl: Duration::from_secs(resolution_cache_secs),
            admin,
        })
    }

    /// Configuration for tests: in-memory database, cheap hashing.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            env: AppEnv::Test,
            server_host: "127.0.0.1".into(),
            server_port: 3001,
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test-secret".into(),
            jwt_ttl: Duration::from_secs(3600),
            bcrypt_cost: 4,
            cors_allowed_origins: None,
            resolution_cache_ttl: Duration::from_secs(60),
            admin: None,
        }
    }
}

fn parse_in_range<T>(name: &'static str, raw: &str, min: T, max: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + fmt::Display + Copy,
{
    let value = raw.parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("'{}' is not a number", raw),
    })?;
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = config(&[]).expect("config");
        assert_eq!(config.env, AppEnv::Development);
        assert_eq!(config.server_port, 3001);
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.jwt_ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.resolution_cache_ttl, Duration::from_secs(60));
        assert!(config.admin.is_none());
    }

    #[test]
    fn production_requires_a_secret() {
        let err = config(&[("APP_ENV", "production")]).expect_err("missing secret");
        assert!(matches!(err, ConfigError::Missing { name: "JWT_SECRET" }));

        let ok = config(&[("APP_ENV", "production"), ("JWT_SECRET", "s3cret")]);
        assert!(ok.is_ok());
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        let config = config(&[("PORT", "8080")]).expect("config");
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(config(&[("BCRYPT_COST", "3")]).is_err());
        assert!(config(&[("SERVER_PORT", "0")]).is_err());
        assert!(config(&[("JWT_TTL_HOURS", "soon")]).is_err());
    }

    #[test]
    fn admin_bootstrap_needs_both_credentials() {
        assert!(config(&[("ADMIN_USERNAME", "dm")]).is_err());
        let config = config(&[("ADMIN_USERNAME", "dm"), ("ADMIN_PASSWORD", "Secret123")])
            .expect("config");
        let admin = config.admin.expect("admin");
        assert_eq!(admin.email, "dm@localhost");
    }
}
