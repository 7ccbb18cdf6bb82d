use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::Serialize;
use tracing::debug;

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{HarvestError, Result};
use crate::models::{Clients, Contacts, Invoices, Projects, Tasks};
use crate::request::{build_request, join_url, RequestEnvelope};
use crate::resource::ResourceClient;
use crate::transport::{RawResponse, ReqwestTransport, Transport};

// ---------------------------------------------------------------------------
// Internal request dispatch
// ---------------------------------------------------------------------------

/// Immutable state shared by every resource service: where the API lives,
/// how to reach it and who we are.
#[derive(Clone)]
pub(crate) struct BaseClient {
    base_url: Url,
    user_agent: HeaderValue,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn Credentials>,
}

impl BaseClient {
    fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Self> {
        let base_url = join_url(&config.base_url, "")?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| HarvestError::Config(format!("Invalid user agent: {e}")))?;
        Ok(Self {
            base_url,
            user_agent,
            transport,
            credentials,
        })
    }

    /// Build an authenticated request for `path` under the base URL.
    pub(crate) fn request<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<RequestEnvelope>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut request = build_request(self.base_url.as_str(), method, path, query, body)?;
        self.authorize(&mut request)?;
        Ok(request)
    }

    /// Build an authenticated `GET` for a page link returned by the server.
    ///
    /// The link is used verbatim but must stay under the base URL so
    /// credentials are never sent to another host.
    pub(crate) fn follow(&self, link: &str) -> Result<RequestEnvelope> {
        let url = Url::parse(link).map_err(|e| HarvestError::invalid_url(link, e))?;
        if url.origin() != self.base_url.origin() || !within_base_path(&self.base_url, &url) {
            return Err(HarvestError::invalid_url(
                link,
                format!("link leaves the API root {}", self.base_url),
            ));
        }
        self.request::<(), ()>(Method::GET, "", None, None)
            .map(|mut request| {
                request.url = url;
                request
            })
    }

    fn authorize(&self, request: &mut RequestEnvelope) -> Result<()> {
        request
            .headers
            .insert(USER_AGENT, self.user_agent.clone());
        self.credentials.apply(&mut request.headers)
    }

    /// Dispatch through the transport, bounded by `ctx`.
    pub(crate) async fn send(&self, ctx: &Context, request: RequestEnvelope) -> Result<RawResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let raw = ctx.run(self.transport.send(request)).await?;
        debug!(
            status = raw.status.as_u16(),
            bytes = raw.body.len(),
            "received response"
        );
        Ok(raw)
    }
}

/// Whether `url` names the base path itself or something below it, compared
/// segment by segment: `/v2/clients` is under `/v2`, `/v2evil` is not.
fn within_base_path(base: &Url, url: &Url) -> bool {
    let root = base.path().trim_end_matches('/');
    let path = url.path();
    root.is_empty()
        || path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("base_url", &self.base_url.as_str())
            .field("transport", &self.transport)
            .field("credentials", &self.credentials)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Main entry point for interacting with the Harvest API.
///
/// The client holds no mutable state and can be cloned and shared across
/// tasks freely.
///
/// ```no_run
/// use harvest_client::{ClientConfig, ClientListOptions, Context, HarvestClient};
///
/// # async fn example() -> harvest_client::Result<()> {
/// let client = HarvestClient::new(&ClientConfig::from_env()?)?;
/// let ctx = Context::background();
///
/// let (page, _) = client.clients().list(&ctx, &ClientListOptions::default()).await?;
/// for c in &page.items {
///     println!("{}: {:?}", c.id, c.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HarvestClient {
    base: BaseClient,
}

impl HarvestClient {
    /// Create a client using the default reqwest transport and the
    /// credentials named in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Self::with_transport(config, transport)
    }

    /// Create a client that sends every request through `transport`.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(config, transport, config.credentials()?)?,
        })
    }

    /// Replace the credentials derived from the configuration.
    pub fn with_credentials(mut self, credentials: Arc<dyn Credentials>) -> Self {
        self.base.credentials = credentials;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base.base_url.as_str()
    }

    // -- resource accessors --------------------------------------------------

    pub fn clients(&self) -> ResourceClient<'_, Clients> {
        ResourceClient::new(&self.base)
    }

    pub fn contacts(&self) -> ResourceClient<'_, Contacts> {
        ResourceClient::new(&self.base)
    }

    pub fn projects(&self) -> ResourceClient<'_, Projects> {
        ResourceClient::new(&self.base)
    }

    pub fn tasks(&self) -> ResourceClient<'_, Tasks> {
        ResourceClient::new(&self.base)
    }

    pub fn invoices(&self) -> ResourceClient<'_, Invoices> {
        ResourceClient::new(&self.base)
    }
}
