use tracing::{debug, error, info, warn};

use crate::config::{env_parse_or, env_required, ConfigError};

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, at least 32 characters)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 60)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load("")
    }

    /// Same as [`JwtConfig::from_env`] but reads `TEST_`-prefixed variables.
    pub fn from_test_env() -> Result<Self, ConfigError> {
        Self::load("TEST_")
    }

    fn load(prefix: &str) -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from {}JWT_* environment variables", prefix);

        let jwt_secret = env_required(&format!("{}JWT_SECRET", prefix))?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = env_parse_or(&format!("{}JWT_ACCESS_TOKEN_EXPIRY", prefix), 60i64)?;
        let refresh_token_expiration = env_parse_or(&format!("{}JWT_REFRESH_TOKEN_EXPIRY", prefix), 10080i64)?;

        let config = JwtConfig {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
        };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Access token expiration must be greater than 0".to_string()));
        }

        if self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Refresh token expiration must be greater than 0".to_string()));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }

        Ok(())
    }
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_hs256".to_string(),
            access_token_expiration: 60,
            refresh_token_expiration: 10080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(JwtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = JwtConfig::default();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut config = JwtConfig::default();
        config.access_token_expiration = 0;
        assert!(config.validate().is_err());
    }
}
