//! Construction of outgoing requests.
//!
//! [`build_request`] turns a base URL, a path, a method and typed query/body
//! objects into a [`RequestEnvelope`]. Nothing here touches the network.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::{HarvestError, Result};

/// A fully formed request, ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: Url,
    pub headers: HeaderMap,
    /// JSON payload, if any.
    pub body: Option<Vec<u8>>,
}

impl RequestEnvelope {
    /// Decoded query parameters in emission order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// The body parsed back into JSON, for inspection.
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

/// Build a request for `path` under `base_url`.
///
/// `query` is flattened into query parameters by [`query_pairs`]; `body` is
/// serialized to JSON. Passing `None` for either leaves it out entirely.
pub fn build_request<Q, B>(
    base_url: &str,
    method: Method,
    path: &str,
    query: Option<&Q>,
    body: Option<&B>,
) -> Result<RequestEnvelope>
where
    Q: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    let mut url = join_url(base_url, path)?;

    if let Some(query) = query {
        let pairs = query_pairs(query)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let body = match body {
        Some(body) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(serde_json::to_vec(body).map_err(HarvestError::Encoding)?)
        }
        None => None,
    };

    Ok(RequestEnvelope {
        method,
        url,
        headers,
        body,
    })
}

/// Join `path` onto `base_url` and check the result is an absolute http(s)
/// URL. A base path such as `/v2` is kept.
pub fn join_url(base_url: &str, path: &str) -> Result<Url> {
    let raw = if path.is_empty() {
        base_url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    let url = Url::parse(&raw).map_err(|e| HarvestError::invalid_url(&raw, e))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(HarvestError::invalid_url(
            raw,
            "expected an absolute http or https URL",
        ));
    }
    Ok(url)
}

/// Flatten an options object into query parameters.
///
/// The object must serialize to a map (a struct) or to `null`. Every
/// non-null field becomes one `key=value` pair; `None` fields are dropped,
/// so an options value with nothing set yields no parameters at all.
/// Arrays are joined with commas. Pairs are sorted by key.
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>> {
    let fields = match serde_json::to_value(query).map_err(HarvestError::Encoding)? {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(encoding_error(format!(
                "query must serialize to a map, got {}",
                kind(&other)
            )))
        }
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = match value {
            Value::Null => continue,
            Value::Array(items) => items
                .into_iter()
                .map(|item| scalar(&key, item))
                .collect::<Result<Vec<_>>>()?
                .join(","),
            other => scalar(&key, other)?,
        };
        pairs.push((key, rendered));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

fn scalar(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(encoding_error(format!(
            "query field '{key}' cannot be a {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn encoding_error(msg: String) -> HarvestError {
    HarvestError::Encoding(<serde_json::Error as serde::ser::Error>::custom(msg))
}
