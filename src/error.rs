use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for Harvest API operations.
///
/// - `InvalidUrl`: base URL or path do not form an absolute http(s) URL
/// - `Encoding`: a request body or query object cannot be serialized
/// - `Status`: the server answered 4xx/5xx; carries the raw body
/// - `Decoding`: the response body is not the expected JSON shape
/// - `Cancelled` / `DeadlineExceeded`: the call's [`Context`](crate::Context) ended it
/// - `Transport`: network/transport errors (wraps `reqwest::Error`)
/// - `Config`: invalid client configuration
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to encode request: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("API error {status}: {}", status_summary(.status, .body))]
    Status {
        status: StatusCode,
        body: String,
        retry_after: Option<Duration>,
    },

    #[error("Failed to decode response (HTTP {status}): {source}")]
    Decoding {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarvestError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::Decoding { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Raw server payload of a rejected request.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Human readable message from the server's error payload, if any.
    pub fn server_message(&self) -> Option<String> {
        self.body().and_then(server_message)
    }

    /// Delay the server asked for through `Retry-After`.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }

    /// Whether repeating the same request could succeed.
    ///
    /// The client never retries on its own; this is a hint for callers
    /// implementing their own backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Transport(e) => e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Extract the message Harvest puts in its error payloads.
///
/// OAuth errors use `error_description`, validation errors `message`, and
/// some endpoints only `error`.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn status_summary(status: &StatusCode, body: &str) -> String {
    server_message(body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

pub type Result<T> = std::result::Result<T, HarvestError>;
