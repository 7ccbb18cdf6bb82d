//! Typed payloads for every resource.
//!
//! Optional fields are plain `Option<T>`: `None` is left out of outgoing
//! JSON and query strings, while `Some(false)`, `Some(0)` or `Some("")` are
//! sent as given. On decode, a missing or `null` field becomes `None`, and
//! fields the client does not know about are ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

mod client;
mod contact;
mod invoice;
mod project;
mod task;

pub use client::{Client, ClientCreateRequest, ClientListOptions, ClientUpdateRequest, Clients};
pub use contact::{
    Contact, ContactCreateRequest, ContactListOptions, ContactUpdateRequest, Contacts,
};
pub use invoice::{
    Invoice, InvoiceCreateRequest, InvoiceLineItem, InvoiceLineItemRequest, InvoiceListOptions,
    InvoiceState, InvoiceUpdateRequest, Invoices,
};
pub use project::{
    Project, ProjectCreateRequest, ProjectListOptions, ProjectUpdateRequest, Projects,
};
pub use task::{Task, TaskCreateRequest, TaskListOptions, TaskUpdateRequest, Tasks};

/// Server timestamps, normalized to UTC on decode.
pub type Timestamp = DateTime<Utc>;

/// Compact reference to a client embedded in other entities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientRef {
    pub id: i64,
    pub name: Option<String>,
    pub currency: Option<String>,
}

/// Compact reference to a project embedded in other entities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRef {
    pub id: i64,
    pub name: Option<String>,
    pub code: Option<String>,
}
