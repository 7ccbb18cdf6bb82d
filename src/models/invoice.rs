use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ClientRef, ProjectRef, Timestamp};
use crate::resource::Resource;

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Draft,
    Open,
    Paid,
    Closed,
    /// A state this client version does not know.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub client: Option<ClientRef>,
    #[serde(default)]
    pub line_items: Vec<InvoiceLineItem>,
    pub client_key: Option<String>,
    pub number: Option<String>,
    pub purchase_order: Option<String>,
    pub amount: Option<f64>,
    pub due_amount: Option<f64>,
    pub tax: Option<f64>,
    pub tax_amount: Option<f64>,
    pub tax2: Option<f64>,
    pub tax2_amount: Option<f64>,
    pub discount: Option<f64>,
    pub discount_amount: Option<f64>,
    pub subject: Option<String>,
    pub notes: Option<String>,
    pub currency: Option<String>,
    pub state: Option<InvoiceState>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_term: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub paid_date: Option<NaiveDate>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceLineItem {
    pub id: i64,
    pub project: Option<ProjectRef>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
    pub taxed: Option<bool>,
    pub taxed2: Option<bool>,
}

/// Filters for `GET /invoices`. `from`/`to` bound the issue date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<InvoiceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// A line item to create, or with `id` set, to change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceLineItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxed2: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceCreateRequest {
    pub client_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_term: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<InvoiceLineItemRequest>,
}

impl InvoiceCreateRequest {
    pub fn new(client_id: i64) -> Self {
        Self {
            client_id,
            number: None,
            purchase_order: None,
            tax: None,
            tax2: None,
            discount: None,
            subject: None,
            notes: None,
            currency: None,
            issue_date: None,
            due_date: None,
            payment_term: None,
            line_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_term: Option<String>,
    /// Only the listed items are touched; `None` leaves all items alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<InvoiceLineItemRequest>>,
}

/// `/invoices`
#[derive(Debug, Clone, Copy)]
pub struct Invoices;

impl Resource for Invoices {
    const PATH: &'static str = "/invoices";
    const COLLECTION_KEY: &'static str = "invoices";

    type Entity = Invoice;
    type ListOptions = InvoiceListOptions;
    type CreateRequest = InvoiceCreateRequest;
    type UpdateRequest = InvoiceUpdateRequest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::query_pairs;

    #[test]
    fn unknown_state_does_not_break_decoding() {
        let invoice: Invoice =
            serde_json::from_str(r#"{"id": 1, "state": "archived", "line_items": []}"#).unwrap();
        assert_eq!(invoice.state, Some(InvoiceState::Unknown));

        let invoice: Invoice = serde_json::from_str(r#"{"id": 1, "state": "paid"}"#).unwrap();
        assert_eq!(invoice.state, Some(InvoiceState::Paid));
        assert!(invoice.line_items.is_empty());
    }

    #[test]
    fn dates_and_states_render_as_query_values() {
        let options = InvoiceListOptions {
            state: Some(InvoiceState::Open),
            from: NaiveDate::from_ymd_opt(2018, 1, 1),
            to: NaiveDate::from_ymd_opt(2018, 3, 31),
            ..Default::default()
        };
        assert_eq!(
            query_pairs(&options).unwrap(),
            vec![
                ("from".to_string(), "2018-01-01".to_string()),
                ("state".to_string(), "open".to_string()),
                ("to".to_string(), "2018-03-31".to_string()),
            ]
        );
    }
}
