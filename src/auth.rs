//! Credential providers.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{HarvestError, Result};

/// Header Harvest uses to select the account a token acts on.
pub const ACCOUNT_ID_HEADER: &str = "harvest-account-id";

/// Supplies authentication headers for every outgoing request.
pub trait Credentials: Send + Sync + fmt::Debug {
    fn apply(&self, headers: &mut HeaderMap) -> Result<()>;
}

/// Harvest personal access token plus the account it belongs to.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    account_id: String,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            account_id: account_id.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl Credentials for AccessToken {
    fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| HarvestError::Config(format!("Invalid token header value: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let account = HeaderValue::from_str(&self.account_id)
            .map_err(|e| HarvestError::Config(format!("Invalid account id header value: {e}")))?;
        headers.insert(HeaderName::from_static(ACCOUNT_ID_HEADER), account);
        Ok(())
    }
}

/// Sends no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Credentials for Anonymous {
    fn apply(&self, _headers: &mut HeaderMap) -> Result<()> {
        Ok(())
    }
}
