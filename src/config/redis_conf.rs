use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{env_parse_or, ConfigError};

/// Redis connection settings. Redis backs OTP records and the request rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u8,
    pub connection_timeout_secs: u64,
    pub use_tls: bool,
}

impl RedisConfig {
    /// Load Redis configuration from environment variables
    ///
    /// Expected environment variables:
    /// - REDIS_HOST: Redis server host (required)
    /// - REDIS_PORT: Redis server port (defaults to 6379)
    /// - REDIS_USERNAME / REDIS_PASSWORD: optional credentials
    /// - REDIS_DATABASE: Database number (defaults to 0)
    /// - REDIS_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    /// - REDIS_USE_TLS: Whether to use `rediss://` (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Redis configuration from environment variables");

        let host = env::var("REDIS_HOST").map_err(|_| {
            error!("REDIS_HOST environment variable not found");
            ConfigError::EnvVarNotFound("REDIS_HOST".to_string())
        })?;
        debug!("Redis host: {}", host);

        let port = env_parse_or("REDIS_PORT", 6379u16)?;
        let username = env::var("REDIS_USERNAME").ok();
        let password = env::var("REDIS_PASSWORD").ok();
        if password.is_some() {
            debug!("Redis password provided");
        }
        let database = env_parse_or("REDIS_DATABASE", 0u8)?;
        let connection_timeout_secs = env_parse_or("REDIS_CONNECTION_TIMEOUT", 5u64)?;
        let use_tls = env::var("REDIS_USE_TLS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        let config = RedisConfig {
            host,
            port,
            username,
            password,
            database,
            connection_timeout_secs,
            use_tls,
        };

        config.validate()?;
        info!("Redis configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 1,
            connection_timeout_secs: 2,
            use_tls: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("Redis host is empty");
            return Err(ConfigError::ValidationError("Redis host cannot be empty".to_string()));
        }
        if self.port == 0 {
            error!("Redis port is 0");
            return Err(ConfigError::ValidationError("Redis port must be greater than 0".to_string()));
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Redis connection timeout must be greater than 0".to_string()));
        }
        if self.database > 15 {
            warn!("Redis database number is high: {} (Redis default max is 15)", self.database);
        }
        Ok(())
    }

    /// Build the connection URL, e.g. `redis://:secret@localhost:6379/0`.
    pub fn get_connection_url(&self) -> String {
        let scheme = if self.use_tls { "rediss" } else { "redis" };
        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };
        format!("{}://{}{}:{}/{}", scheme, auth, self.host, self.port, self.database)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            connection_timeout_secs: 5,
            use_tls: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_host() {
        let mut config = RedisConfig::default();
        config.host = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_url_no_auth() {
        let config = RedisConfig::default();
        assert_eq!(config.get_connection_url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_connection_url_with_password_and_tls() {
        let mut config = RedisConfig::default();
        config.password = Some("secret".to_string());
        config.use_tls = true;
        assert_eq!(config.get_connection_url(), "rediss://:secret@localhost:6379/0");
    }

    #[test]
    fn test_connection_url_with_username_password() {
        let mut config = RedisConfig::from_test_env();
        config.username = Some("app".to_string());
        config.password = Some("pw".to_string());
        assert_eq!(config.get_connection_url(), "redis://app:pw@localhost:6379/1");
    }
}
