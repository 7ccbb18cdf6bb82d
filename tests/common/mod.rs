//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use harvest_client::{
    Client, ClientConfig, HarvestClient, RawResponse, RequestEnvelope, Result, Timestamp,
    Transport,
};
use reqwest::StatusCode;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const ACCOUNT_ID: &str = "123456";

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {path}: {e}"))
}

pub fn fixture_json(name: &str) -> serde_json::Value {
    serde_json::from_str(&fixture(name)).unwrap()
}

/// Base URL with a `/v2` prefix so path joining is exercised too.
pub fn base_url(server: &MockServer) -> String {
    format!("{}/v2", server.uri())
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .base_url(base_url(server))
        .access_token(TOKEN, ACCOUNT_ID)
        .user_agent("harvest-client tests")
}

pub fn client_for(server: &MockServer) -> HarvestClient {
    HarvestClient::new(&config_for(server)).unwrap()
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// The client every single-client fixture describes.
pub fn client_one() -> Client {
    Client {
        id: 1,
        name: Some("Client 1".into()),
        is_active: Some(true),
        address: Some("Address line 1".into()),
        statement_key: None,
        currency: Some("EUR".into()),
        created_at: Some(utc(2018, 1, 31, 20, 34, 30)),
        updated_at: Some(utc(2018, 5, 31, 21, 34, 30)),
    }
}

/// Transport that records every request and answers with canned responses.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<RequestEnvelope>>,
    responses: Mutex<Vec<RawResponse>>,
}

impl RecordingTransport {
    pub fn replying(responses: Vec<RawResponse>) -> Arc<Self> {
        let mut responses = responses;
        responses.reverse();
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
        })
    }

    pub fn json(status: u16, body: &str) -> RawResponse {
        RawResponse::new(StatusCode::from_u16(status).unwrap(), body)
    }

    pub fn taken(&self) -> Vec<RequestEnvelope> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: RequestEnvelope) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .expect("no canned response left");
        Ok(response)
    }
}
