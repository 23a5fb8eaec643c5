use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::{Credentials, TokenPair};

pub const DEFAULT_API_BASE: &str = "https://api.tripit.com";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.tripit.com/oauth/authorize";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("tripit-oauth1/", env!("CARGO_PKG_VERSION"));

pub const CONSUMER_KEY_VAR: &str = "TRIPIT_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "TRIPIT_CONSUMER_SECRET";
pub const OAUTH_TOKEN_VAR: &str = "TRIPIT_OAUTH_TOKEN";
pub const OAUTH_TOKEN_SECRET_VAR: &str = "TRIPIT_OAUTH_TOKEN_SECRET";
pub const API_BASE_VAR: &str = "TRIPIT_API_BASE";
pub const TIMEOUT_VAR: &str = "TRIPIT_TIMEOUT_SECS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is not a valid URL ({value}) : {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be a whole number of seconds, got {1:?}")]
    InvalidTimeout(&'static str, String),
}

/// Settings the TripIt client is started with.
#[derive(Debug, Clone)]
pub struct Config {
    consumer_key: String,
    consumer_secret: SecretString,
    token: Option<TokenPair>,
    api_base: String,
    authorize_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Config {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Config {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Pre-provisioned access token, skipping the login flow.
    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Config {
            token: Some(TokenPair::new(token, token_secret)),
            ..self
        }
    }

    /// Base for both the `/oauth/*` and `/v1/*` endpoints.
    pub fn api_base(self, api_base: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            api_base: validate_url("api_base", api_base)?,
            ..self
        })
    }

    pub fn authorize_url(self, authorize_url: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            authorize_url: validate_url("authorize_url", authorize_url)?,
            ..self
        })
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Config { timeout, ..self }
    }

    pub fn user_agent<T: Into<String>>(self, user_agent: T) -> Self {
        Config {
            user_agent: user_agent.into(),
            ..self
        }
    }

    /// Reads the `TRIPIT_*` variables of the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let mut config = Config::new(required(CONSUMER_KEY_VAR)?, required(CONSUMER_SECRET_VAR)?);

        config.token =
            TokenPair::non_blank(lookup(OAUTH_TOKEN_VAR), lookup(OAUTH_TOKEN_SECRET_VAR));
        if let Some(base) = lookup(API_BASE_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.api_base(&base)?;
        }
        if let Some(secs) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(TIMEOUT_VAR, secs.clone()))?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Consumer pair plus the pre-provisioned token, if any.
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(
            self.consumer_key.as_str(),
            self.consumer_secret.expose_secret(),
        );
        match &self.token {
            Some(pair) => credentials.token_pair(pair.clone()),
            None => credentials,
        }
    }

    pub fn request_token_url(&self) -> String {
        format!("{}/oauth/request_token", self.api_base)
    }

    pub fn access_token_url(&self) -> String {
        format!("{}/oauth/access_token", self.api_base)
    }

    pub fn authorize_endpoint(&self) -> &str {
        &self.authorize_url
    }

    /// Absolute URL of a REST path such as `/v1/list/trip`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Checks `value` parses as an absolute http(s) URL without query and returns
/// it without trailing slash.
fn validate_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason,
    };
    let parsed = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}
