use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::resource::Resource;

/// A customer that projects and invoices are billed to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub address: Option<String>,
    pub statement_key: Option<String>,
    pub currency: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Filters for `GET /clients`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl ClientCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: None,
            address: None,
            currency: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// `/clients`
#[derive(Debug, Clone, Copy)]
pub struct Clients;

impl Resource for Clients {
    const PATH: &'static str = "/clients";
    const COLLECTION_KEY: &'static str = "clients";

    type Entity = Client;
    type ListOptions = ClientListOptions;
    type CreateRequest = ClientCreateRequest;
    type UpdateRequest = ClientUpdateRequest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::query_pairs;
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamps_with_offsets_become_utc() {
        let client: Client = serde_json::from_str(
            r#"{"id": 9, "created_at": "2018-01-31T22:34:30+02:00", "updated_at": null}"#,
        )
        .unwrap();
        assert_eq!(
            client.created_at,
            Some(Utc.with_ymd_and_hms(2018, 1, 31, 20, 34, 30).unwrap())
        );
        assert_eq!(client.updated_at, None);
        assert_eq!(client.name, None);
    }

    #[test]
    fn false_is_sent_but_none_is_not() {
        let update = ClientUpdateRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"is_active": false})
        );

        let options = ClientListOptions {
            is_active: Some(false),
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(
            query_pairs(&options).unwrap(),
            vec![
                ("is_active".to_string(), "false".to_string()),
                ("per_page".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn create_always_sends_name() {
        let create = ClientCreateRequest::new("Acme");
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            serde_json::json!({"name": "Acme"})
        );
    }
}
