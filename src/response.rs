//! Response classification and JSON decoding.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{HarvestError, Result};
use crate::transport::RawResponse;

/// What is left of a response once its body has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    fn of(raw: &RawResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers.clone(),
        }
    }
}

/// Fail with [`HarvestError::Status`] on a 4xx/5xx answer.
pub fn check_status(raw: &RawResponse) -> Result<()> {
    if raw.status.is_client_error() || raw.status.is_server_error() {
        return Err(HarvestError::Status {
            status: raw.status,
            body: String::from_utf8_lossy(&raw.body).into_owned(),
            retry_after: retry_after(&raw.headers),
        });
    }
    Ok(())
}

/// Decode a successful response body into `T`.
///
/// Unknown fields are ignored and missing optional fields stay `None`; both
/// are properties of the destination types.
pub fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<(T, ResponseMeta)> {
    check_status(raw)?;
    let value = serde_json::from_slice(&raw.body).map_err(|source| HarvestError::Decoding {
        status: raw.status,
        source,
    })?;
    Ok((value, ResponseMeta::of(raw)))
}

/// Accept a successful response without decoding its body.
pub fn decode_empty(raw: &RawResponse) -> Result<ResponseMeta> {
    check_status(raw)?;
    Ok(ResponseMeta::of(raw))
}

/// `Retry-After` in its delay-seconds form. HTTP dates are not supported.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
