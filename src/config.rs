use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth app credentials; required to serve the web flow, not needed
    /// for a headless sync with a pre-issued token.
    pub oauth: Option<OAuthConfig>,
    pub database_path: String,
    pub listen_addr: String,
    /// Externally reachable base URL, used to build the OAuth redirect_uri.
    pub public_base_url: String,
    pub api_base_url: String,
    pub per_page: u32,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("GITHUB_CLIENT_ID").ok();
        let client_secret = env::var("GITHUB_CLIENT_SECRET").ok();

        let oauth = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(OAuthConfig {
                client_id,
                client_secret,
                authorize_url: env::var("GITHUB_AUTHORIZE_URL")
                    .unwrap_or_else(|_| GITHUB_AUTHORIZE_URL.to_string()),
                token_url: env::var("GITHUB_TOKEN_URL")
                    .unwrap_or_else(|_| GITHUB_TOKEN_URL.to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must be set together".to_string(),
                ))
            }
        };

        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "repos.db".to_string());

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", listen_addr));

        let api_base_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| GITHUB_API_URL.to_string());

        let per_page = env::var("FETCH_PER_PAGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let mut retry = RetryConfig::default();
        if let Some(max) = env::var("FETCH_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            retry.max_attempts = max;
        }

        Ok(Self {
            oauth,
            database_path,
            listen_addr,
            public_base_url,
            api_base_url,
            per_page,
            retry,
        })
    }

    pub fn oauth(&self) -> Result<&OAuthConfig> {
        self.oauth.as_ref().ok_or_else(|| {
            Error::Config(
                "GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET environment variables not set"
                    .to_string(),
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oauth: None,
            database_path: "repos.db".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            public_base_url: "http://127.0.0.1:8080".to_string(),
            api_base_url: GITHUB_API_URL.to_string(),
            per_page: 60,
            retry: RetryConfig::default(),
        }
    }
}

/// Backoff schedule for transient GitHub API failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first try; total calls per endpoint is
    /// `max_attempts + 1`.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

