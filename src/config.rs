use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AccessToken, Anonymous, Credentials};
use crate::error::{HarvestError, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.harvestapp.com/v2";

/// Settings used to build a [`HarvestClient`](crate::HarvestClient).
///
/// ```
/// use std::time::Duration;
/// use harvest_client::ClientConfig;
///
/// let config = ClientConfig::default()
///     .access_token("token", "123456")
///     .user_agent("my-app (ops@example.com)")
///     .timeout(Duration::from_secs(30));
/// assert_eq!(config.base_url, "https://api.harvestapp.com/v2");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    /// Harvest rejects requests without a `User-Agent`.
    pub user_agent: String,
    /// Whole-request timeout applied by the default transport.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            account_id: None,
            user_agent: concat!("harvest-client/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn access_token(mut self, token: impl Into<String>, account_id: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self.account_id = Some(account_id.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// | Variable               | Field          |
    /// |------------------------|----------------|
    /// | `HARVEST_BASE_URL`     | `base_url`     |
    /// | `HARVEST_ACCESS_TOKEN` | `access_token` |
    /// | `HARVEST_ACCOUNT_ID`   | `account_id`   |
    /// | `HARVEST_USER_AGENT`   | `user_agent`   |
    /// | `HARVEST_TIMEOUT_SECS` | `timeout`      |
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(base_url) = var("HARVEST_BASE_URL") {
            config.base_url = base_url;
        }
        config.access_token = var("HARVEST_ACCESS_TOKEN");
        config.account_id = var("HARVEST_ACCOUNT_ID");
        if let Some(user_agent) = var("HARVEST_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(secs) = var("HARVEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                HarvestError::Config(format!("HARVEST_TIMEOUT_SECS must be whole seconds: {e}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Credentials described by this configuration.
    ///
    /// A token and an account id must be given together.
    pub fn credentials(&self) -> Result<Arc<dyn Credentials>> {
        match (&self.access_token, &self.account_id) {
            (Some(token), Some(account_id)) => {
                Ok(Arc::new(AccessToken::new(token.clone(), account_id.clone())))
            }
            (None, None) => Ok(Arc::new(Anonymous)),
            (Some(_), None) => Err(HarvestError::Config(
                "an access token requires an account id".into(),
            )),
            (None, Some(_)) => Err(HarvestError::Config(
                "an account id requires an access token".into(),
            )),
        }
    }
}
