use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ClientRef, Timestamp};
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub id: i64,
    pub client: Option<ClientRef>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
    pub is_billable: Option<bool>,
    pub is_fixed_fee: Option<bool>,
    /// `Project`, `Tasks`, `People` or `none`.
    pub bill_by: Option<String>,
    pub hourly_rate: Option<f64>,
    pub budget: Option<f64>,
    /// `project`, `project_cost`, `task`, `task_fees`, `person` or `none`.
    pub budget_by: Option<String>,
    pub budget_is_monthly: Option<bool>,
    pub notify_when_over_budget: Option<bool>,
    pub over_budget_notification_percentage: Option<f64>,
    pub show_budget_to_all: Option<bool>,
    pub cost_budget: Option<f64>,
    pub cost_budget_include_expenses: Option<bool>,
    pub fee: Option<f64>,
    pub notes: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
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
pub struct ProjectCreateRequest {
    pub client_id: i64,
    pub name: String,
    pub is_billable: bool,
    pub bill_by: String,
    pub budget_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fixed_fee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_when_over_budget: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_budget_to_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<NaiveDate>,
}

impl ProjectCreateRequest {
    pub fn new(
        client_id: i64,
        name: impl Into<String>,
        is_billable: bool,
        bill_by: impl Into<String>,
        budget_by: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            name: name.into(),
            is_billable,
            bill_by: bill_by.into(),
            budget_by: budget_by.into(),
            code: None,
            is_active: None,
            is_fixed_fee: None,
            hourly_rate: None,
            budget: None,
            notify_when_over_budget: None,
            show_budget_to_all: None,
            fee: None,
            notes: None,
            starts_on: None,
            ends_on: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fixed_fee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_when_over_budget: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_budget_to_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<NaiveDate>,
}

/// `/projects`
#[derive(Debug, Clone, Copy)]
pub struct Projects;

impl Resource for Projects {
    const PATH: &'static str = "/projects";
    const COLLECTION_KEY: &'static str = "projects";

    type Entity = Project;
    type ListOptions = ProjectListOptions;
    type CreateRequest = ProjectCreateRequest;
    type UpdateRequest = ProjectUpdateRequest;
}
