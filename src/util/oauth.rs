use async_trait::async_trait;
use reqwest::{header, Url};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::social_auth_conf::OAuthClientConfig;
use crate::config::SocialAuthConfig;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";
const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),
    #[error("{0} login is not configured")]
    NotConfigured(OAuthProvider),
    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider rejected the authorization code: {0}")]
    Exchange(String),
    #[error("Provider did not return an email address")]
    MissingEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(OAuthError::UnknownProvider(other.to_string())),
        }
    }
}

/// Identity returned by a provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialProfile {
    pub provider: OAuthProvider,
    pub social_id: String,
    pub email: String,
}

#[async_trait]
pub trait OAuthClient: Send + Sync {
    fn authorize_url(&self, provider: OAuthProvider) -> Result<String, OAuthError>;
    async fn exchange_code(&self, provider: OAuthProvider, code: &str) -> Result<SocialProfile, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    sub: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// Authorization-code flow against Google and GitHub.
pub struct HttpOAuthClient {
    http: reqwest::Client,
    config: SocialAuthConfig,
}

impl HttpOAuthClient {
    pub fn new(config: SocialAuthConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpOAuthClient { http, config })
    }

    fn client_for(&self, provider: OAuthProvider) -> Result<&OAuthClientConfig, OAuthError> {
        match provider {
            OAuthProvider::Google => self.config.google.as_ref(),
            OAuthProvider::Github => self.config.github.as_ref(),
        }
        .ok_or(OAuthError::NotConfigured(provider))
    }

    async fn access_token(&self, provider: OAuthProvider, code: &str) -> Result<String, OAuthError> {
        let client = self.client_for(provider)?;
        let token_url = match provider {
            OAuthProvider::Google => GOOGLE_TOKEN_URL,
            OAuthProvider::Github => GITHUB_TOKEN_URL,
        };
        let redirect_uri = self.config.callback_url(provider.as_str());
        let params = [
            ("code", code),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let reply: TokenReply = self
            .http
            .post(token_url)
            .header(header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        reply.access_token.ok_or_else(|| {
            let reason = reply
                .error_description
                .or(reply.error)
                .unwrap_or_else(|| "no access token".to_string());
            warn!("{} token exchange failed: {}", provider, reason);
            OAuthError::Exchange(reason)
        })
    }

    async fn github_primary_email(&self, token: &str) -> Result<String, OAuthError> {
        let emails: Vec<GithubEmail> = self
            .http
            .get(GITHUB_EMAILS_URL)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        emails
            .iter()
            .find(|e| e.primary && e.verified)
            .or_else(|| emails.iter().find(|e| e.verified))
            .map(|e| e.email.clone())
            .ok_or(OAuthError::MissingEmail)
    }
}

#[async_trait]
impl OAuthClient for HttpOAuthClient {
    fn authorize_url(&self, provider: OAuthProvider) -> Result<String, OAuthError> {
        let client = self.client_for(provider)?;
        let redirect_uri = self.config.callback_url(provider.as_str());
        let (base, scope) = match provider {
            OAuthProvider::Google => (GOOGLE_AUTHORIZE_URL, "openid email profile"),
            OAuthProvider::Github => (GITHUB_AUTHORIZE_URL, "user:email"),
        };
        let url = Url::parse_with_params(
            base,
            &[
                ("client_id", client.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope),
            ],
        )
        .map_err(|e| OAuthError::Exchange(e.to_string()))?;
        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, provider: OAuthProvider, code: &str) -> Result<SocialProfile, OAuthError> {
        let token = self.access_token(provider, code).await?;

        let (social_id, email) = match provider {
            OAuthProvider::Google => {
                let user: GoogleUser = self
                    .http
                    .get(GOOGLE_USERINFO_URL)
                    .bearer_auth(&token)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                (user.sub, user.email.ok_or(OAuthError::MissingEmail)?)
            }
            OAuthProvider::Github => {
                let user: GithubUser = self
                    .http
                    .get(GITHUB_USER_URL)
                    .bearer_auth(&token)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let email = match user.email {
                    Some(email) => email,
                    None => self.github_primary_email(&token).await?,
                };
                (user.id.to_string(), email)
            }
        };

        debug!("{} identified {}", provider, email);
        Ok(SocialProfile { provider, social_id, email: email.to_lowercase() })
    }
}
