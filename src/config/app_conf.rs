use std::env;
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Five megabytes, the image upload ceiling.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the service exposing `/menu/{id}`, used to enrich cart lines.
    pub restaurant_service_url: String,
    /// Directory where uploaded images are written and served from.
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub catalog_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let restaurant_service_url = env::var("RESTAURANT_SERVICE_URL").unwrap_or_else(|_| {
            let url = format!("http://{}:{}/api", host, port);
            warn!("RESTAURANT_SERVICE_URL not set, defaulting to {}", url);
            url
        });
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let catalog_timeout_secs = env::var("CATALOG_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        debug!(
            host = %host,
            port = port,
            upload_dir = %upload_dir,
            "Application configuration loaded"
        );
        AppConfig {
            host,
            port,
            restaurant_service_url,
            upload_dir,
            max_upload_bytes,
            catalog_timeout_secs,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.restaurant_service_url.is_empty() {
            return Err(ConfigError::ValidationError("RESTAURANT_SERVICE_URL cannot be empty".to_string()));
        }
        if self.upload_dir.is_empty() {
            return Err(ConfigError::ValidationError("UPLOAD_DIR cannot be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError("MAX_UPLOAD_BYTES must be greater than 0".to_string()));
        }
        if self.catalog_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("CATALOG_TIMEOUT_SECS must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            restaurant_service_url: "http://127.0.0.1:8080/api".to_string(),
            upload_dir: "uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            catalog_timeout_secs: 5,
        }
    }
}
