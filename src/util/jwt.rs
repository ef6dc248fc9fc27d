use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::model::user::UserRole;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (hex ObjectId)
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    /// `access` or `refresh`
    pub token_type: String,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: String, actual: String },
}

pub trait TokenService: Send + Sync {
    fn issue_pair(&self, user_id: &str, email: &str, role: UserRole) -> Result<TokenPair, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(auth_header: &str) -> Result<&str, JwtError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(JwtError::InvalidToken)?;
    if token.is_empty() {
        return Err(JwtError::InvalidToken);
    }
    Ok(token)
}

/// HS256 implementation backed by [`JwtConfig`].
#[derive(Debug, Clone)]
pub struct JwtTokenService {
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        JwtTokenService { config }
    }

    fn sign(&self, user_id: &str, email: &str, role: UserRole, token_type: TokenType, minutes: i64) -> Result<String, JwtError> {
        debug!("Signing {} token for user {} ({})", token_type.as_str(), user_id, role);
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(minutes)).timestamp(),
            token_type: token_type.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|err| {
            error!("Failed to encode JWT token: {}", err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let claims = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => {
                    warn!("Rejected expired {} token", expected.as_str());
                    JwtError::TokenExpired
                }
                _ => {
                    debug!("Failed to decode JWT token: {}", err);
                    JwtError::DecodingFailed(err.to_string())
                }
            })?
            .claims;

        if claims.token_type != expected.as_str() {
            warn!("Token type mismatch for user {}: got {}", claims.sub, claims.token_type);
            return Err(JwtError::InvalidTokenType {
                expected: expected.as_str().to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }
}

impl TokenService for JwtTokenService {
    fn issue_pair(&self, user_id: &str, email: &str, role: UserRole) -> Result<TokenPair, JwtError> {
        let access_token = self.sign(user_id, email, role, TokenType::Access, self.config.access_token_expiration)?;
        let refresh_token = self.sign(user_id, email, role, TokenType::Refresh, self.config.refresh_token_expiration)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_expiration * 60,
            token_type: "Bearer".to_string(),
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Refresh)
    }
}
