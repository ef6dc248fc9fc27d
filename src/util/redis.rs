use crate::config::RedisConfig;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Operation error: {0}")]
    OperationError(String),
    #[error("Timeout error: {0}")]
    TimeoutError(String),
}

/// Key/value operations used by OTP storage and the rate limiter.
#[async_trait]
pub trait RedisServiceTrait: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError>;
    async fn set_string_with_expiry(&self, key: &str, value: &str, expiry_secs: u64) -> Result<(), RedisError>;
    async fn delete(&self, key: &str) -> Result<bool, RedisError>;
    async fn increment(&self, key: &str) -> Result<i64, RedisError>;
    async fn expire(&self, key: &str, secs: u64) -> Result<bool, RedisError>;
    async fn get_ttl(&self, key: &str) -> Result<i64, RedisError>;
    async fn ping(&self) -> Result<String, RedisError>;
}

#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
}

fn op_err(op: &str, key: &str, e: redis::RedisError) -> RedisError {
    error!("Redis {} failed for key '{}': {}", op, key, e);
    RedisError::OperationError(format!("{} failed: {}", op, e))
}

impl RedisService {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");
        config.validate().map_err(|e| RedisError::ConfigError(e.to_string()))?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisError::ConnectionError(format!("Client creation failed: {}", e))
        })?;

        let timeout = Duration::from_secs(config.connection_timeout_secs);
        let connection_manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| RedisError::TimeoutError(format!("no connection after {}s", config.connection_timeout_secs)))?
            .map_err(|e| {
                error!("Failed to create Redis connection manager: {}", e);
                RedisError::ConnectionError(format!("Connection manager creation failed: {}", e))
            })?;

        let service = RedisService { connection_manager };
        service.ping().await?;
        info!("Redis service initialized successfully");
        Ok(service)
    }

    fn conn(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }
}

#[async_trait]
impl RedisServiceTrait for RedisService {
    async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError> {
        self.conn().get::<_, Option<String>>(key).await.map_err(|e| op_err("GET", key, e))
    }

    #[instrument(skip(self, value))]
    async fn set_string_with_expiry(&self, key: &str, value: &str, expiry_secs: u64) -> Result<(), RedisError> {
        debug!("SETEX {} ({}s)", key, expiry_secs);
        self.conn()
            .set_ex::<_, _, ()>(key, value, expiry_secs)
            .await
            .map_err(|e| op_err("SETEX", key, e))
    }

    async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        let removed: i64 = self.conn().del(key).await.map_err(|e| op_err("DEL", key, e))?;
        Ok(removed > 0)
    }

    async fn increment(&self, key: &str) -> Result<i64, RedisError> {
        self.conn().incr(key, 1i64).await.map_err(|e| op_err("INCR", key, e))
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<bool, RedisError> {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        self.conn().expire(key, secs).await.map_err(|e| op_err("EXPIRE", key, e))
    }

    async fn get_ttl(&self, key: &str) -> Result<i64, RedisError> {
        self.conn().ttl(key).await.map_err(|e| op_err("TTL", key, e))
    }

    async fn ping(&self) -> Result<String, RedisError> {
        let mut conn = self.conn();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| op_err("PING", "-", e))?;
        if reply != "PONG" {
            return Err(RedisError::OperationError(format!("Unexpected ping response: {}", reply)));
        }
        Ok(reply)
    }
}
