pub mod redis_conf;
pub mod jwt_conf;
pub mod email_conf;
pub mod otp_conf;
pub mod mongo_conf;
pub mod admin_user_conf;
pub mod app_conf;
pub mod rate_limit_conf;
pub mod social_auth_conf;


pub use redis_conf::RedisConfig;
pub use jwt_conf::JwtConfig;
pub use email_conf::EmailConfig;
pub use otp_conf::OtpConfig;
pub use rate_limit_conf::RateLimitConfig;
pub use social_auth_conf::SocialAuthConfig;

use tracing::{error, warn};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read `key` from the environment and parse it, falling back to `default` when unset.
pub(crate) fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| {
            error!("Invalid {} value: {}", key, raw);
            ConfigError::ParseError(format!("Invalid {} value: {}", key, raw))
        }),
        Err(_) => {
            warn!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

/// Read a required variable.
pub(crate) fn env_required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| {
        error!("{} environment variable not found", key);
        ConfigError::EnvVarNotFound(key.to_string())
    })
}
