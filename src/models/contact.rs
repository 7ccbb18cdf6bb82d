use serde::{Deserialize, Serialize};

use super::{ClientRef, Timestamp};
use crate::resource::Resource;

/// A person at a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub client: Option<ClientRef>,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_office: Option<String>,
    pub phone_mobile: Option<String>,
    pub fax: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactCreateRequest {
    pub client_id: i64,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
}

impl ContactCreateRequest {
    pub fn new(client_id: i64, first_name: impl Into<String>) -> Self {
        Self {
            client_id,
            first_name: first_name.into(),
            title: None,
            last_name: None,
            email: None,
            phone_office: None,
            phone_mobile: None,
            fax: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
}

/// `/contacts`
#[derive(Debug, Clone, Copy)]
pub struct Contacts;

impl Resource for Contacts {
    const PATH: &'static str = "/contacts";
    const COLLECTION_KEY: &'static str = "contacts";

    type Entity = Contact;
    type ListOptions = ContactListOptions;
    type CreateRequest = ContactCreateRequest;
    type UpdateRequest = ContactUpdateRequest;
}
