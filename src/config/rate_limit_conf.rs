use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

use crate::config::{env_parse_or, ConfigError};

/// Global per-IP fixed-window request limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: i64,
    pub window_secs: u64,
    pub redis_key_prefix: String,
}

impl RateLimitConfig {
    /// RATE_LIMIT_MAX (500), RATE_LIMIT_WINDOW_SECS (900), RATE_LIMIT_REDIS_PREFIX (`rate:`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = RateLimitConfig {
            max_requests: env_parse_or("RATE_LIMIT_MAX", 500i64)?,
            window_secs: env_parse_or("RATE_LIMIT_WINDOW_SECS", 900u64)?,
            redis_key_prefix: env::var("RATE_LIMIT_REDIS_PREFIX").unwrap_or_else(|_| "rate:".to_string()),
        };
        config.validate()?;
        info!(
            max_requests = config.max_requests,
            window_secs = config.window_secs,
            "Rate limit configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests <= 0 {
            return Err(ConfigError::ValidationError("RATE_LIMIT_MAX must be greater than 0".to_string()));
        }
        if self.window_secs == 0 {
            return Err(ConfigError::ValidationError("RATE_LIMIT_WINDOW_SECS must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn get_redis_key(&self, client: &str) -> String {
        format!("{}{}", self.redis_key_prefix, client)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: 500,
            window_secs: 15 * 60,
            redis_key_prefix: "rate:".to_string(),
        }
    }
}
