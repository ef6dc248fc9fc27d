use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::config::ConfigError;

/// Client credentials registered with one OAuth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAuthConfig {
    /// Front end the callback redirects to, as `{frontend_url}/auth/callback?token=`
    pub frontend_url: String,
    /// Public base URL of this service; callbacks land on `{base}/api/auth/{provider}/callback`
    pub callback_base_url: String,
    pub google: Option<OAuthClientConfig>,
    pub github: Option<OAuthClientConfig>,
}

impl SocialAuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| {
            warn!("FRONTEND_URL not set, defaulting to http://localhost:3000");
            "http://localhost:3000".to_string()
        });
        let callback_base_url = env::var("OAUTH_CALLBACK_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let config = SocialAuthConfig {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            callback_base_url: callback_base_url.trim_end_matches('/').to_string(),
            google: Self::client("GOOGLE"),
            github: Self::client("GITHUB"),
        };
        config.validate()?;
        info!(
            google = config.google.is_some(),
            github = config.github.is_some(),
            "Social login configuration loaded"
        );
        Ok(config)
    }

    fn client(prefix: &str) -> Option<OAuthClientConfig> {
        let client_id = env::var(format!("{}_CLIENT_ID", prefix)).ok()?;
        let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).ok()?;
        Some(OAuthClientConfig { client_id, client_secret })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [("FRONTEND_URL", &self.frontend_url), ("OAUTH_CALLBACK_BASE_URL", &self.callback_base_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!("{} must be an http(s) URL", name)));
            }
        }
        Ok(())
    }

    pub fn callback_url(&self, provider: &str) -> String {
        format!("{}/api/auth/{}/callback", self.callback_base_url, provider)
    }
}

impl Default for SocialAuthConfig {
    fn default() -> Self {
        SocialAuthConfig {
            frontend_url: "http://localhost:3000".to_string(),
            callback_base_url: "http://localhost:8080".to_string(),
            google: None,
            github: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url() {
        let config = SocialAuthConfig::default();
        assert_eq!(config.callback_url("github"), "http://localhost:8080/api/auth/github/callback");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_http_frontend_rejected() {
        let mut config = SocialAuthConfig::default();
        config.frontend_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());
    }
}
