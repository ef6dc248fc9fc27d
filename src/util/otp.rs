use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::OtpConfig;
use crate::util::clock::Clock;
use crate::util::redis::{RedisError, RedisServiceTrait};

/// One pending verification code, stored as JSON under `otp:<email>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    pub email: String,
    pub code: String,
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("Invalid OTP")]
    Invalid,
    #[error("OTP expired")]
    Expired,
    #[error("OTP storage error: {0}")]
    Storage(#[from] RedisError),
    #[error("Corrupt OTP record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait OtpService: Send + Sync {
    /// Store a fresh code for `email`, replacing any previous one, and return it.
    async fn issue(&self, email: &str) -> Result<OtpRecord, OtpError>;
    /// Check `code` and consume the record on success.
    async fn verify(&self, email: &str, code: &str) -> Result<(), OtpError>;
    fn valid_minutes(&self) -> u64;
}

pub struct RedisOtpService {
    config: OtpConfig,
    redis: Arc<dyn RedisServiceTrait>,
    clock: Arc<dyn Clock>,
}

impl RedisOtpService {
    pub fn new(config: OtpConfig, redis: Arc<dyn RedisServiceTrait>, clock: Arc<dyn Clock>) -> Self {
        RedisOtpService { config, redis, clock }
    }

    fn generate_code(&self) -> String {
        let len = self.config.code_length as u32;
        let low = 10u64.pow(len - 1);
        let high = 10u64.pow(len);
        rand::thread_rng().gen_range(low..high).to_string()
    }
}

#[async_trait]
impl OtpService for RedisOtpService {
    #[instrument(skip(self))]
    async fn issue(&self, email: &str) -> Result<OtpRecord, OtpError> {
        let now = self.clock.now_unix_secs();
        let ttl = self.config.expiration_secs as i64;
        let record = OtpRecord {
            email: email.to_string(),
            code: self.generate_code(),
            created_at: now,
            expires_at: now + ttl,
        };
        let payload = serde_json::to_string(&record).map_err(|e| OtpError::Corrupt(e.to_string()))?;

        // Kept past its expiry so a late attempt reads "OTP expired" rather than "Invalid OTP".
        self.redis
            .set_string_with_expiry(&self.config.get_redis_key(email), &payload, self.config.expiration_secs * 2)
            .await?;
        info!("Issued OTP for {}", email);
        Ok(record)
    }

    #[instrument(skip(self, code))]
    async fn verify(&self, email: &str, code: &str) -> Result<(), OtpError> {
        let code = code.trim();
        if code.len() != self.config.code_length {
            debug!("OTP of wrong length presented for {}", email);
            return Err(OtpError::Invalid);
        }
        let key = self.config.get_redis_key(email);
        let raw = self.redis.get_string(&key).await?.ok_or(OtpError::Invalid)?;
        let record: OtpRecord = serde_json::from_str(&raw).map_err(|e| OtpError::Corrupt(e.to_string()))?;

        if record.code != code {
            debug!("OTP mismatch for {}", email);
            return Err(OtpError::Invalid);
        }
        if record.expires_at < self.clock.now_unix_secs() {
            warn!("Expired OTP presented for {}", email);
            return Err(OtpError::Expired);
        }

        self.redis.delete(&key).await?;
        Ok(())
    }

    fn valid_minutes(&self) -> u64 {
        self.config.expiration_minutes()
    }
}
