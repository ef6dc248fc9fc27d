use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{env_parse_or, ConfigError};

/// Settings for emailed one-time verification codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Code lifetime in seconds
    pub expiration_secs: u64,
    /// Number of digits in a code
    pub code_length: usize,
    /// Redis key prefix for OTP records
    pub redis_key_prefix: String,
}

impl OtpConfig {
    /// Create OtpConfig from environment variables
    ///
    /// - OTP_EXPIRATION_SECS: defaults to 300 (5 minutes)
    /// - OTP_LENGTH: defaults to 6
    /// - OTP_REDIS_PREFIX: defaults to `otp:`
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading OTP configuration from environment variables");

        let expiration_secs = env_parse_or("OTP_EXPIRATION_SECS", 300u64)?;
        let code_length = env_parse_or("OTP_LENGTH", 6usize)?;
        let redis_key_prefix = env::var("OTP_REDIS_PREFIX").unwrap_or_else(|_| {
            warn!("OTP_REDIS_PREFIX not set, defaulting to otp:");
            "otp:".to_string()
        });
        debug!(
            "OTP expiration: {}s, length: {}, prefix: {}",
            expiration_secs, code_length, redis_key_prefix
        );

        let config = OtpConfig {
            expiration_secs,
            code_length,
            redis_key_prefix,
        };

        config.validate()?;
        info!("OTP configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        OtpConfig {
            expiration_secs: 300,
            code_length: 6,
            redis_key_prefix: "test_otp:".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration_secs == 0 {
            error!("OTP expiration is 0");
            return Err(ConfigError::ValidationError("OTP expiration must be greater than 0".to_string()));
        }

        if !(4..=10).contains(&self.code_length) {
            error!("OTP length out of range: {}", self.code_length);
            return Err(ConfigError::ValidationError("OTP length must be between 4 and 10 digits".to_string()));
        }

        if self.redis_key_prefix.is_empty() {
            return Err(ConfigError::ValidationError("OTP Redis prefix cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Redis key holding the active code for `email`.
    pub fn get_redis_key(&self, email: &str) -> String {
        format!("{}{}", self.redis_key_prefix, email)
    }

    pub fn expiration_minutes(&self) -> u64 {
        self.expiration_secs.div_ceil(60)
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        OtpConfig {
            expiration_secs: 300,
            code_length: 6,
            redis_key_prefix: "otp:".to_string(),
        }
    }
}
