//! Envelope shape for every resource, checked through a recording transport,
//! plus decoding of the richer project and invoice payloads.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use harvest_client::{
    Anonymous, ClientConfig, ContactCreateRequest, ContactListOptions, Context, HarvestClient,
    HarvestError, InvoiceCreateRequest, InvoiceLineItemRequest, InvoiceListOptions, InvoiceState,
    ProjectUpdateRequest, TaskCreateRequest, TaskListOptions, Transport,
};
use pretty_assertions::assert_eq;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const BASE: &str = "https://api.harvestapp.com/v2";

fn recording_client(transport: Arc<RecordingTransport>) -> HarvestClient {
    let config = ClientConfig::default().access_token(TOKEN, ACCOUNT_ID);
    HarvestClient::with_transport(&config, transport as Arc<dyn Transport>).unwrap()
}

#[tokio::test]
async fn test_contacts_list_with_filter() {
    let transport = RecordingTransport::replying(vec![RecordingTransport::json(
        200,
        r#"{"contacts": [{"id": 4706479, "first_name": "Jane", "client": {"id": 5735776, "name": "123 Industries"}}],
            "per_page": 100, "total_pages": 1, "total_entries": 1, "page": 1}"#,
    )]);
    let client = recording_client(transport.clone());

    let (list, _) = client
        .contacts()
        .list(
            &Context::background(),
            &ContactListOptions {
                client_id: Some(5735776),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.items[0].first_name.as_deref(), Some("Jane"));
    assert_eq!(list.items[0].client.as_ref().map(|c| c.id), Some(5735776));
    assert_eq!(list.pagination.links, None);

    let requests = transport.taken();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(
        requests[0].url.as_str(),
        format!("{BASE}/contacts?client_id=5735776")
    );
    assert_eq!(requests[0].headers[AUTHORIZATION], "Bearer test-token");
}

#[tokio::test]
async fn test_contact_create_sends_required_fields() {
    let transport = RecordingTransport::replying(vec![RecordingTransport::json(
        201,
        r#"{"id": 1, "first_name": "George", "last_name": "Frank"}"#,
    )]);
    let client = recording_client(transport.clone());

    let mut create = ContactCreateRequest::new(5735776, "George");
    create.last_name = Some("Frank".into());
    let (contact, _) = client
        .contacts()
        .create(&Context::background(), &create)
        .await
        .unwrap();
    assert_eq!(contact.last_name.as_deref(), Some("Frank"));

    let request = &transport.taken()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), format!("{BASE}/contacts"));
    assert_eq!(
        request.json_body(),
        Some(json!({"client_id": 5735776, "first_name": "George", "last_name": "Frank"}))
    );
}

#[tokio::test]
async fn test_tasks_round_trip() {
    let transport = RecordingTransport::replying(vec![
        RecordingTransport::json(
            200,
            r#"{"tasks": [], "per_page": 100, "total_pages": 0, "total_entries": 0, "page": 1}"#,
        ),
        RecordingTransport::json(
            201,
            r#"{"id": 8083800, "name": "New Task Name", "billable_by_default": true,
                "default_hourly_rate": 120.0, "is_default": false, "is_active": true,
                "created_at": "2017-06-26T22:04:31Z", "updated_at": "2017-06-26T22:04:31Z"}"#,
        ),
        RecordingTransport::json(200, ""),
    ]);
    let client = recording_client(transport.clone());
    let ctx = Context::background();

    let (list, _) = client
        .tasks()
        .list(
            &ctx,
            &TaskListOptions {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(list.is_empty());

    // Fields absent from the request come back populated by the server.
    let mut create = TaskCreateRequest::new("New Task Name");
    create.default_hourly_rate = Some(120.0);
    let (task, _) = client.tasks().create(&ctx, &create).await.unwrap();
    assert_eq!(task.name.as_deref(), Some("New Task Name"));
    assert_eq!(task.default_hourly_rate, Some(120.0));
    assert_eq!(task.billable_by_default, Some(true));
    assert_eq!(task.created_at, Some(utc(2017, 6, 26, 22, 4, 31)));

    client.tasks().delete(&ctx, task.id).await.unwrap();

    let requests = transport.taken();
    let summary: Vec<(Method, String)> = requests
        .iter()
        .map(|r| (r.method.clone(), r.url.to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Method::GET, format!("{BASE}/tasks?is_active=true")),
            (Method::POST, format!("{BASE}/tasks")),
            (Method::DELETE, format!("{BASE}/tasks/8083800")),
        ]
    );
    assert!(requests[2].body.is_none());
}

#[tokio::test]
async fn test_invoice_create_and_list_filters() {
    let transport = RecordingTransport::replying(vec![
        RecordingTransport::json(201, &fixture("invoice/get/response_1.json")),
        RecordingTransport::json(
            200,
            r#"{"invoices": [], "per_page": 100, "total_pages": 0, "total_entries": 0, "page": 1}"#,
        ),
    ]);
    let client = recording_client(transport.clone());
    let ctx = Context::background();

    let mut create = InvoiceCreateRequest::new(5735776);
    create.subject = Some("ABC Project Quote".into());
    create.due_date = NaiveDate::from_ymd_opt(2017, 7, 27);
    create.line_items.push(InvoiceLineItemRequest {
        kind: Some("Service".into()),
        description: Some("ABC Project".into()),
        unit_price: Some(5000.0),
        ..Default::default()
    });
    client.invoices().create(&ctx, &create).await.unwrap();

    client
        .invoices()
        .list(
            &ctx,
            &InvoiceListOptions {
                state: Some(InvoiceState::Open),
                from: NaiveDate::from_ymd_opt(2017, 1, 1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let requests = transport.taken();
    assert_eq!(
        requests[0].json_body(),
        Some(json!({
            "client_id": 5735776,
            "subject": "ABC Project Quote",
            "due_date": "2017-07-27",
            "line_items": [
                {"kind": "Service", "description": "ABC Project", "unit_price": 5000.0}
            ]
        }))
    );
    assert_eq!(
        requests[1].query_pairs(),
        vec![
            ("from".to_string(), "2017-01-01".to_string()),
            ("state".to_string(), "open".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_get_project_and_invoice_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/14308069"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("project/get/response_1.json"), "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/invoices/13150378"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("invoice/get/response_1.json"), "application/json"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ctx = Context::background();

    let (project, _) = client.projects().get(&ctx, 14308069).await.unwrap();
    assert_eq!(project.code.as_deref(), Some("OS1"));
    assert_eq!(project.starts_on, NaiveDate::from_ymd_opt(2017, 6, 1));
    assert_eq!(project.ends_on, None);
    assert_eq!(project.fee, None);
    assert_eq!(project.notes.as_deref(), Some(""));
    assert_eq!(project.client.unwrap().name.as_deref(), Some("123 Industries"));

    let (invoice, _) = client.invoices().get(&ctx, 13150378).await.unwrap();
    assert_eq!(invoice.state, Some(InvoiceState::Paid));
    assert_eq!(invoice.amount, Some(10700.0));
    assert_eq!(invoice.discount, None);
    assert_eq!(invoice.paid_date, NaiveDate::from_ymd_opt(2017, 8, 21));
    assert_eq!(invoice.line_items.len(), 1);
    assert_eq!(
        invoice.line_items[0].project.as_ref().map(|p| p.id),
        Some(14308069)
    );
}

#[tokio::test]
async fn test_project_update_is_patch() {
    let transport = RecordingTransport::replying(vec![RecordingTransport::json(
        200,
        &fixture("project/get/response_1.json"),
    )]);
    let client = recording_client(transport.clone());

    client
        .projects()
        .update(
            &Context::background(),
            14308069,
            &ProjectUpdateRequest {
                budget: Some(0.0),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let request = &transport.taken()[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.url.as_str(), format!("{BASE}/projects/14308069"));
    assert_eq!(
        request.json_body(),
        Some(json!({"budget": 0.0, "is_active": false}))
    );
}

#[tokio::test]
async fn test_anonymous_credentials_send_no_auth() {
    let transport = RecordingTransport::replying(vec![RecordingTransport::json(
        200,
        r#"{"id": 1}"#,
    )]);
    let client = recording_client(transport.clone()).with_credentials(Arc::new(Anonymous));
    client.clients().get(&Context::background(), 1).await.unwrap();

    let request = &transport.taken()[0];
    assert!(request.headers.get(AUTHORIZATION).is_none());
    assert!(request.headers.get("harvest-account-id").is_none());
    assert!(request.headers.get("user-agent").is_some());
}

#[tokio::test]
async fn test_invalid_base_url_fails_at_construction() {
    let config = ClientConfig::default().base_url("api.harvestapp.com/v2");
    let err = HarvestClient::new(&config).unwrap_err();
    assert!(matches!(err, HarvestError::InvalidUrl { .. }), "{err:?}");

    let config = ClientConfig {
        account_id: Some(ACCOUNT_ID.into()),
        ..Default::default()
    };
    let err = HarvestClient::new(&config).unwrap_err();
    assert!(matches!(err, HarvestError::Config(_)), "{err:?}");
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/clients/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("client/get/response_1.json"), "application/json"),
        )
        .expect(8)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let calls: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.clients().get(&Context::background(), 1).await })
        })
        .collect();

    for call in calls {
        let (c, _) = call.await.unwrap().unwrap();
        assert_eq!(c, client_one());
    }
}
