use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::resource::Resource;

/// A kind of work time can be tracked against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: Option<String>,
    pub billable_by_default: Option<bool>,
    pub default_hourly_rate: Option<f64>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskListOptions {
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
pub struct TaskCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_by_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl TaskCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            billable_by_default: None,
            default_hourly_rate: None,
            is_default: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_by_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// `/tasks`
#[derive(Debug, Clone, Copy)]
pub struct Tasks;

impl Resource for Tasks {
    const PATH: &'static str = "/tasks";
    const COLLECTION_KEY: &'static str = "tasks";

    type Entity = Task;
    type ListOptions = TaskListOptions;
    type CreateRequest = TaskCreateRequest;
    type UpdateRequest = TaskUpdateRequest;
}
