use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::auth_dto::{AuthResponse, AuthTokens, RegisterRequest};
use crate::dto::rbac_dto::UserWithRoles;
use crate::model::user::{User, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::service::rbac_service::RbacService;
use crate::util::email::{EmailMessage, EmailSender};
use crate::util::error::ServiceError;
use crate::util::jwt::TokenService;
use crate::util::oauth::{OAuthClient, OAuthProvider};
use crate::util::otp::OtpService;
use crate::util::password::{hash_password, verify_password};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<(), ServiceError>;
    async fn verify_otp(&self, email: &str, code: &str) -> Result<(), ServiceError>;
    async fn resend_otp(&self, email: &str) -> Result<(), ServiceError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, ServiceError>;
    async fn me(&self, user: User) -> Result<UserWithRoles, ServiceError>;
    fn social_authorize_url(&self, provider: &str) -> Result<String, ServiceError>;
    /// Finish a social login and return the front-end redirect target.
    async fn social_callback(&self, provider: &str, code: &str) -> Result<String, ServiceError>;
}

pub struct AuthServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    rbac: Arc<dyn RbacService>,
    tokens: Arc<dyn TokenService>,
    otp: Arc<dyn OtpService>,
    mailer: Arc<dyn EmailSender>,
    oauth: Arc<dyn OAuthClient>,
    frontend_url: String,
}

impl AuthServiceImpl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        rbac: Arc<dyn RbacService>,
        tokens: Arc<dyn TokenService>,
        otp: Arc<dyn OtpService>,
        mailer: Arc<dyn EmailSender>,
        oauth: Arc<dyn OAuthClient>,
        frontend_url: String,
    ) -> Self {
        AuthServiceImpl { user_repo, rbac, tokens, otp, mailer, oauth, frontend_url }
    }

    async fn send_code(&self, email: &str) -> Result<(), ServiceError> {
        let record = self.otp.issue(email).await?;
        let message = EmailMessage::otp(email, &record.code, self.otp.valid_minutes());
        self.mailer.send(message).await.map_err(|e| {
            error!("Failed to send OTP mail to {}: {}", email, e);
            ServiceError::InternalError("Failed to send verification email".to_string())
        })
    }

    fn issue_tokens(&self, user: &User) -> Result<AuthTokens, ServiceError> {
        Ok(self.tokens.issue_pair(&user.id_hex(), &user.email, user.role)?.into())
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid credentials".to_string())
}

fn provider(raw: &str) -> Result<OAuthProvider, ServiceError> {
    raw.parse::<OAuthProvider>().map_err(|e| ServiceError::NotFound(e.to_string()))
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, req), fields(email = %req.email))]
    async fn register(&self, req: RegisterRequest) -> Result<(), ServiceError> {
        let role = req.role.unwrap_or_default();
        if !role.is_self_assignable() {
            return Err(ServiceError::InvalidInput(format!("Role '{}' cannot be chosen at sign-up", role)));
        }
        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let mut user = User::new(&req.email);
        user.password_hash = Some(hash_password(&req.password)?);
        user.first_name = req.first_name.unwrap_or_default();
        user.last_name = req.last_name.unwrap_or_default();
        user.phone = req.phone;
        user.role = role;
        let user = self.user_repo.insert(user).await?;
        info!("User registered");

        self.send_code(&user.email).await
    }

    #[instrument(skip(self, code))]
    async fn verify_otp(&self, email: &str, code: &str) -> Result<(), ServiceError> {
        let email = email.trim().to_lowercase();
        self.otp.verify(&email, code).await?;
        self.user_repo.mark_verified(&email).await?;
        info!("Email verified");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resend_otp(&self, email: &str) -> Result<(), ServiceError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        if user.is_verified {
            return Err(ServiceError::InvalidInput("Email already verified".to_string()));
        }
        self.send_code(&user.email).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        let user = self.user_repo.find_by_email(email).await?.ok_or_else(invalid_credentials)?;
        let hash = user.password_hash.as_deref().ok_or_else(|| {
            warn!("Password login attempted on a social account");
            invalid_credentials()
        })?;
        if !verify_password(password, hash)? {
            warn!("Invalid credentials");
            return Err(invalid_credentials());
        }
        if !user.is_verified && !user.is_social() {
            return Err(ServiceError::Forbidden("Email not verified".to_string()));
        }

        let tokens = self.issue_tokens(&user)?;
        info!("User logged in");
        Ok(AuthResponse { user: user.into(), tokens })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, ServiceError> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        let id = ObjectId::parse_str(&claims.sub).map_err(|_| ServiceError::Unauthorized("Invalid token".into()))?;
        let user = self
            .user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))?;
        self.issue_tokens(&user)
    }

    async fn me(&self, user: User) -> Result<UserWithRoles, ServiceError> {
        let roles = self.rbac.roles_of(&user).await?;
        Ok(UserWithRoles { user: user.into(), roles })
    }

    fn social_authorize_url(&self, raw: &str) -> Result<String, ServiceError> {
        let provider = provider(raw)?;
        self.oauth
            .authorize_url(provider)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))
    }

    #[instrument(skip(self, code))]
    async fn social_callback(&self, raw: &str, code: &str) -> Result<String, ServiceError> {
        let provider = provider(raw)?;
        let profile = self.oauth.exchange_code(provider, code).await.map_err(|e| {
            warn!("Social login failed: {}", e);
            ServiceError::Unauthorized(format!("{} login failed", provider))
        })?;

        let user = match self.user_repo.find_by_email(&profile.email).await? {
            Some(existing) if existing.social_id.is_some() => existing,
            Some(existing) => {
                let id = existing.id.ok_or_else(|| ServiceError::InternalError("Stored user has no id".into()))?;
                self.user_repo.link_social(&id, provider.as_str(), &profile.social_id).await?
            }
            None => {
                let mut user = User::new(&profile.email);
                user.is_verified = true;
                user.role = UserRole::Customer;
                user.social_id = Some(profile.social_id.clone());
                user.provider = Some(provider.as_str().to_string());
                info!("Creating account from {} login", provider);
                self.user_repo.insert(user).await?
            }
        };

        let tokens = self.issue_tokens(&user)?;
        Ok(format!("{}/auth/callback?token={}", self.frontend_url, tokens.access_token))
    }
}
