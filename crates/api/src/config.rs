//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST` - bind address (default: `0.0.0.0`)
//! - `PORT` - listen port (default: `3000`)
//! - `RUST_LOG` - tracing filter directive (default: `info`)
//! - `DATABASE_URL` - PostgreSQL connection string; when absent the local
//!   JSON files are used
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: `5`)
//! - `FORCE_LOCAL_STORE` - use the JSON files even when a database is
//!   configured (default: `false`)
//! - `LOCAL_DATA_DIR` - directory of the JSON files (default: `server/lib`)
//! - `JWT_SECRET` - token signing secret
//! - `JWT_EXPIRES_IN_DAYS` - token lifetime (default: `7`)
//! - `BCRYPT_COST` - password hashing cost (default: `12`)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - account seeded into a fresh users file
//! - `BOT_WEBHOOK_URL` - contact messages are forwarded here when set
//! - `CORS_ALLOW_ORIGIN` - allowed browser origin (default: any)

use std::path::PathBuf;

use domain::AuthConfig;
use secrecy::{ExposeSecret, SecretString};
use storage::BootstrapAdmin;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "irth-biladi-development-secret";
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub force_local_store: bool,
    pub local_data_dir: PathBuf,
    pub jwt_secret: SecretString,
    pub jwt_expires_in_days: i64,
    pub bcrypt_cost: u32,
    pub admin_email: String,
    pub admin_password: SecretString,
    pub bot_webhook_url: Option<String>,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bcrypt_cost = parse(&var, "BCRYPT_COST", defaults.bcrypt_cost)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidEnvVar(
                "BCRYPT_COST",
                format!(
                    "must be between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            ));
        }

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse(&var, "PORT", defaults.port)?,
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL").map(SecretString::from),
            database_max_connections: parse(
                &var,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            force_local_store: parse_bool(&var, "FORCE_LOCAL_STORE")?,
            local_data_dir: var("LOCAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_data_dir),
            jwt_secret: var("JWT_SECRET")
                .map(SecretString::from)
                .unwrap_or(defaults.jwt_secret),
            jwt_expires_in_days: parse(&var, "JWT_EXPIRES_IN_DAYS", defaults.jwt_expires_in_days)?,
            bcrypt_cost,
            admin_email: var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: var("ADMIN_PASSWORD")
                .map(SecretString::from)
                .unwrap_or(defaults.admin_password),
            bot_webhook_url: var("BOT_WEBHOOK_URL"),
            cors_allow_origin: var("CORS_ALLOW_ORIGIN"),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when `JWT_SECRET` was not provided.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEV_JWT_SECRET
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: chrono::Duration::days(self.jwt_expires_in_days),
            bcrypt_cost: self.bcrypt_cost,
        }
    }

    pub fn bootstrap_admin(&self) -> BootstrapAdmin {
        BootstrapAdmin {
            email: self.admin_email.clone(),
            password: self.admin_password.expose_secret().to_string(),
            bcrypt_cost: self.bcrypt_cost,
            ..BootstrapAdmin::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let admin = BootstrapAdmin::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            force_local_store: false,
            local_data_dir: PathBuf::from("server/lib"),
            jwt_secret: SecretString::from(DEV_JWT_SECRET.to_string()),
            jwt_expires_in_days: 7,
            bcrypt_cost: 12,
            admin_email: admin.email,
            admin_password: SecretString::from(admin.password),
            bot_webhook_url: None,
            cors_allow_origin: None,
        }
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            key,
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.local_data_dir, PathBuf::from("server/lib"));
        assert_eq!(config.jwt_expires_in_days, 7);
        assert_eq!(config.bcrypt_cost, 12);
        assert!(config.database_url.is_none());
        assert!(config.uses_development_secret());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_values_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("DATABASE_URL", "postgres://shop@db/shop"),
            ("FORCE_LOCAL_STORE", "true"),
            ("LOCAL_DATA_DIR", "/var/lib/shop"),
            ("JWT_SECRET", "s3cr3t"),
            ("BCRYPT_COST", "10"),
            ("BOT_WEBHOOK_URL", "https://bot.example.com/hook"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert!(config.force_local_store);
        assert_eq!(config.local_data_dir, PathBuf::from("/var/lib/shop"));
        assert_eq!(config.jwt_secret.expose_secret(), "s3cr3t");
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.bootstrap_admin().bcrypt_cost, 10);
        assert_eq!(
            config.database_url.as_ref().map(|u| u.expose_secret().to_string()),
            Some("postgres://shop@db/shop".to_string())
        );
        assert_eq!(
            config.bot_webhook_url.as_deref(),
            Some("https://bot.example.com/hook")
        );
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  "), ("PORT", "")])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("FORCE_LOCAL_STORE", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BCRYPT_COST", "40")])).is_err());
    }

    #[test]
    #[serial]
    fn test_from_process_env() {
        // SAFETY: serialized with every other test that touches the environment.
        unsafe {
            std::env::set_var("JWT_EXPIRES_IN_DAYS", "30");
            std::env::set_var("ADMIN_EMAIL", "owner@cilka.com");
        }
        let config = Config::from_env();
        unsafe {
            std::env::remove_var("JWT_EXPIRES_IN_DAYS");
            std::env::remove_var("ADMIN_EMAIL");
        }

        let config = config.unwrap();
        assert_eq!(config.jwt_expires_in_days, 30);
        assert_eq!(config.admin_email, "owner@cilka.com");
        assert_eq!(config.auth_config().token_ttl, chrono::Duration::days(30));
    }
}
