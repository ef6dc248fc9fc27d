use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{env_parse_or, env_required, ConfigError};

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Application name reported to the server
    pub app_name: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// - MONGO_URI, MONGO_DATABASE: required
    /// - MONGO_USERNAME / MONGO_PASSWORD: optional credentials
    /// - MONGO_APP_NAME: defaults to FoodPlatformBackend
    /// - MONGO_POOL_SIZE: defaults to 10
    /// - MONGO_CONNECTION_TIMEOUT: defaults to 5 seconds
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env_required("MONGO_URI")?;
        let database = env_required("MONGO_DATABASE")?;
        let username = env::var("MONGO_USERNAME").ok();
        let password = env::var("MONGO_PASSWORD").ok();
        debug!(
            "MongoDB database: {}, user: {}, password set: {}",
            database,
            username.as_deref().unwrap_or("<none>"),
            password.is_some()
        );

        let app_name = env::var("MONGO_APP_NAME").unwrap_or_else(|_| "FoodPlatformBackend".to_string());
        let pool_size = env_parse_or("MONGO_POOL_SIZE", 10u32)?;
        let connection_timeout_secs = env_parse_or("MONGO_CONNECTION_TIMEOUT", 5u64)?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            app_name,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Create MongoConfig for testing
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "food_platform_test".to_string(),
            username: None,
            password: None,
            app_name: "FoodPlatformBackendTest".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }

        if self.app_name.is_empty() {
            return Err(ConfigError::ValidationError("MongoDB app name cannot be empty".to_string()));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }

        // Credentials come as a pair or not at all.
        match (&self.username, &self.password) {
            (Some(u), Some(p)) if u.is_empty() || p.is_empty() => {
                error!("MongoDB credentials are blank");
                Err(ConfigError::ValidationError("MongoDB username and password cannot be empty if set".to_string()))
            }
            (Some(_), None) | (None, Some(_)) => {
                Err(ConfigError::ValidationError("MongoDB username and password must be set together".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Open a client with the configured pool/credentials and return the database handle.
    pub async fn connect(&self) -> Result<mongodb::Database, mongodb::error::Error> {
        use mongodb::{options::{ClientOptions, Credential, ResolverConfig}, Client};

        info!("Connecting to MongoDB database '{}'", self.database);
        let mut client_options = ClientOptions::parse_with_resolver_config(&self.uri, ResolverConfig::cloudflare()).await?;
        client_options.app_name = Some(self.app_name.clone());
        client_options.max_pool_size = Some(self.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(self.connection_timeout_secs));

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            client_options.credential = Some(Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build());
        }

        let client = Client::with_options(client_options)?;
        Ok(client.database(&self.database))
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "food_platform".to_string(),
            username: None,
            password: None,
            app_name: "FoodPlatformBackend".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
