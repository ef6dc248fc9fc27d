use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{env_parse_or, env_required, ConfigError};

/// SMTP settings for the verification-code mailer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Whether to use TLS encryption
    pub use_tls: bool,
    /// STARTTLS upgrade instead of implicit TLS
    pub use_starttls: bool,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
    pub connection_timeout_secs: u64,
}

impl EmailConfig {
    /// Create EmailConfig from environment variables
    ///
    /// Required: SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD, SMTP_FROM_EMAIL.
    /// Optional: SMTP_PORT (587), SMTP_USE_TLS (true), SMTP_USE_STARTTLS (true),
    /// SMTP_FROM_NAME, SMTP_CONNECTION_TIMEOUT (30).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let smtp_host = env_required("SMTP_HOST")?;
        let smtp_port = env_parse_or("SMTP_PORT", 587u16)?;
        let smtp_username = env_required("SMTP_USERNAME")?;
        let smtp_password = env_required("SMTP_PASSWORD")?;
        debug!("SMTP {}:{} as {} (password [REDACTED])", smtp_host, smtp_port, smtp_username);

        let use_tls = env_parse_or("SMTP_USE_TLS", true)?;
        let use_starttls = env_parse_or("SMTP_USE_STARTTLS", true)?;
        let from_email = env_required("SMTP_FROM_EMAIL")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Food Platform".to_string());
        let connection_timeout_secs = env_parse_or("SMTP_CONNECTION_TIMEOUT", 30u64)?;

        let config = EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            use_tls,
            use_starttls,
            from_email,
            from_name,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Create EmailConfig for testing
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "test@example.com".to_string(),
            from_name: "Test App".to_string(),
            connection_timeout_secs: 10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }

        if self.smtp_username.is_empty() || self.smtp_password.is_empty() {
            error!("SMTP credentials are incomplete");
            return Err(ConfigError::ValidationError("SMTP username and password are required".to_string()));
        }

        let mut parts = self.from_email.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                error!("Invalid from email: {}", self.from_email);
                return Err(ConfigError::ValidationError("Invalid from email format".to_string()));
            }
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }

        Ok(())
    }

    /// Get SMTP server URL
    pub fn get_smtp_url(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }
}
