//! The network boundary.
//!
//! The client never talks to the network directly: it hands a
//! [`RequestEnvelope`] to a [`Transport`] and gets a [`RawResponse`] back.
//! [`ReqwestTransport`] is the default implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::error::{HarvestError, Result};
use crate::request::RequestEnvelope;

/// An undecoded HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Performs one HTTP round-trip.
///
/// Implementations must not interpret the status code; classifying
/// responses is the decoder's job. Dropping the returned future must abort
/// the in-flight request.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: RequestEnvelope) -> Result<RawResponse>;
}

/// [`Transport`] backed by an async [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport with an optional whole-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Wrap an already configured client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestEnvelope) -> Result<RawResponse> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// reqwest reports its own timeout as a plain error; surface it the same way
/// as a context deadline.
fn classify(err: reqwest::Error) -> HarvestError {
    if err.is_timeout() {
        HarvestError::DeadlineExceeded
    } else {
        HarvestError::Transport(err)
    }
}
