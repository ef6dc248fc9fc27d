use std::env;
use serde::{Serialize, Deserialize};
use crate::config::{env_required, ConfigError};

pub const DEFAULT_SUPER_ADMIN_ROLE: &str = "Super Admin";

/// Seed account created as `system_admin` on first start, holder of the `Super Admin` RBAC role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub super_admin_role: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = AdminUserConfig {
            first_name: env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "System".to_string()),
            last_name: env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "Admin".to_string()),
            email: env_required("ADMIN_EMAIL")?.trim().to_lowercase(),
            password: env_required("ADMIN_PASSWORD")?,
            super_admin_role: env::var("ADMIN_RBAC_ROLE").unwrap_or_else(|_| DEFAULT_SUPER_ADMIN_ROLE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.email.contains('@') {
            return Err(ConfigError::ValidationError("ADMIN_EMAIL must be an email address".to_string()));
        }
        if self.password.len() < 6 {
            return Err(ConfigError::ValidationError("ADMIN_PASSWORD must be at least 6 characters".to_string()));
        }
        if self.super_admin_role.is_empty() {
            return Err(ConfigError::ValidationError("ADMIN_RBAC_ROLE cannot be empty".to_string()));
        }
        Ok(())
    }
}
