//! Harvest API client library for Rust.
//!
//! A typed, async client for the [Harvest v2 API](https://help.getharvest.com/api-v2/):
//! clients, contacts, projects, tasks and invoices, each exposed through the
//! same List/Get/Create/Update/Delete service.
//!
//! # Quick Start
//!
//! ```no_run
//! use harvest_client::{ClientConfig, ClientListOptions, Context, HarvestClient};
//!
//! # async fn example() -> harvest_client::Result<()> {
//! let config = ClientConfig::default().access_token("token", "123456");
//! let client = HarvestClient::new(&config)?;
//! let ctx = Context::background();
//!
//! // Walk every page of active clients.
//! let options = ClientListOptions {
//!     is_active: Some(true),
//!     ..Default::default()
//! };
//! let (mut page, _) = client.clients().list(&ctx, &options).await?;
//! loop {
//!     for c in &page.items {
//!         println!("{}: {}", c.id, c.name.as_deref().unwrap_or("-"));
//!     }
//!     match client.clients().next_page(&ctx, &page).await? {
//!         Some((next, _)) => page = next,
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! Every call runs the same steps: [`request::build_request`] builds a
//! [`RequestEnvelope`], a [`Transport`] performs the round-trip under a
//! [`Context`], [`response::decode`] classifies and decodes the answer, and
//! list calls additionally go through [`pagination::decode_list`].

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod pagination;
pub mod request;
pub mod resource;
pub mod response;
pub mod transport;

// Re-export the main public types at the crate root for convenience.
pub use auth::{AccessToken, Anonymous, Credentials};
pub use client::HarvestClient;
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{HarvestError, Result};
pub use models::{
    Client, ClientCreateRequest, ClientListOptions, ClientRef, ClientUpdateRequest, Clients,
    Contact, ContactCreateRequest, ContactListOptions, ContactUpdateRequest, Contacts, Invoice,
    InvoiceCreateRequest, InvoiceLineItem, InvoiceLineItemRequest, InvoiceListOptions,
    InvoiceState, InvoiceUpdateRequest, Invoices, Project, ProjectCreateRequest,
    ProjectListOptions, ProjectRef, ProjectUpdateRequest, Projects, Task, TaskCreateRequest,
    TaskListOptions, TaskUpdateRequest, Tasks, Timestamp,
};
pub use pagination::{List, PageLinks, Pagination};
pub use request::RequestEnvelope;
pub use resource::{Resource, ResourceClient};
pub use response::ResponseMeta;
pub use transport::{RawResponse, ReqwestTransport, Transport};
