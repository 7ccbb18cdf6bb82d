//! Page metadata for list endpoints.
//!
//! Harvest embeds pagination in the list body next to the items:
//!
//! ```json
//! {
//!   "clients": [...],
//!   "per_page": 100, "total_pages": 3, "total_entries": 253,
//!   "next_page": 2, "previous_page": null, "page": 1,
//!   "links": {
//!     "first": "https://api.harvestapp.com/v2/clients?page=1&per_page=100",
//!     "next": "https://api.harvestapp.com/v2/clients?page=2&per_page=100",
//!     "previous": null,
//!     "last": "https://api.harvestapp.com/v2/clients?page=3&per_page=100"
//!   }
//! }
//! ```
//!
//! When the body has no `links` object, an RFC 8288 `Link` header is used
//! instead. Links are kept exactly as the server sent them. One page is
//! decoded at a time; following `next` is up to the caller.

use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{HarvestError, Result};
use crate::response::{decode, ResponseMeta};
use crate::transport::RawResponse;

/// Absolute URLs of the neighbouring pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub first: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub last: Option<String>,
}

/// Position of one page within a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub per_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub total_entries: Option<u64>,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub page: Option<u32>,
    pub links: Option<PageLinks>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.next_page.is_some() || self.next_link().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_page.is_some() || self.links.as_ref().is_some_and(|l| l.previous.is_some())
    }

    pub fn next_link(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.next.as_deref())
    }

    /// `next_page` is set iff `page < total_pages`, `previous_page` iff
    /// `page > 1`, and the `next`/`previous` links follow the same rule.
    /// Pages without `page`/`total_pages` are trivially consistent.
    pub fn is_consistent(&self) -> bool {
        let (Some(page), Some(total)) = (self.page, self.total_pages) else {
            return true;
        };
        let expect_next = page < total;
        let expect_previous = page > 1;

        let numbers_ok = self.next_page.is_some() == expect_next
            && self.previous_page.is_some() == expect_previous;
        let links_ok = self.links.as_ref().map_or(true, |l| {
            l.next.is_some() == expect_next && l.previous.is_some() == expect_previous
        });
        numbers_ok && links_ok
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct List<T> {
    /// Items in server order.
    pub items: Vec<T>,
    pub pagination: Pagination,
    /// URL this page was fetched from, filters included. Used to request a
    /// numbered page when the server sends no `next` link.
    pub url: Option<Url>,
}

impl<T> List<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Decode a list body whose items sit under `collection_key`.
pub fn decode_list<T: DeserializeOwned>(
    raw: &RawResponse,
    collection_key: &'static str,
) -> Result<(List<T>, ResponseMeta)> {
    let (mut body, meta): (Map<String, Value>, _) = decode(raw)?;
    let decoding = |source: serde_json::Error| HarvestError::Decoding {
        status: raw.status,
        source,
    };

    let items = body
        .remove(collection_key)
        .ok_or_else(|| decoding(<serde_json::Error as serde::de::Error>::missing_field(
            collection_key,
        )))?;
    let items: Vec<T> = serde_json::from_value(items).map_err(decoding)?;
    let pagination = parse_pagination(Value::Object(body), &raw.headers).map_err(decoding)?;

    Ok((
        List {
            items,
            pagination,
            url: None,
        },
        meta,
    ))
}

/// Read page metadata from the body fields left after removing the items,
/// falling back to the `Link` header for links.
pub fn parse_pagination(meta: Value, headers: &HeaderMap) -> serde_json::Result<Pagination> {
    let mut pagination: Pagination = serde_json::from_value(meta)?;

    if pagination.links.is_none() {
        pagination.links = link_header(headers);
    }
    if !pagination.is_consistent() {
        warn!(
            page = ?pagination.page,
            total_pages = ?pagination.total_pages,
            next_page = ?pagination.next_page,
            previous_page = ?pagination.previous_page,
            "page metadata disagrees with page position"
        );
    }
    Ok(pagination)
}

fn link_header(headers: &HeaderMap) -> Option<PageLinks> {
    let mut links: Option<PageLinks> = None;
    for value in headers.get_all(LINK) {
        let Ok(value) = value.to_str() else {
            warn!("ignoring non-ASCII Link header");
            continue;
        };
        let parsed = parse_link_header(value);
        let merged = links.get_or_insert_with(PageLinks::default);
        merged.first = merged.first.take().or(parsed.first);
        merged.next = merged.next.take().or(parsed.next);
        merged.previous = merged.previous.take().or(parsed.previous);
        merged.last = merged.last.take().or(parsed.last);
    }
    links
}

/// Parse an RFC 8288 `Link` header value such as
/// `<https://x/clients?page=2>; rel="next", <https://x/clients?page=5>; rel="last"`.
///
/// Only `first`, `next`, `prev`/`previous` and `last` relations are kept.
/// Entries whose target is not an absolute URL are skipped.
pub fn parse_link_header(value: &str) -> PageLinks {
    let mut links = PageLinks::default();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let Some((target, after)) = rest
            .strip_prefix('<')
            .and_then(|s| s.split_once('>'))
        else {
            warn!(header = value, "malformed Link header entry");
            break;
        };
        let (params, next) = split_entry(after);
        rest = next;

        if Url::parse(target).is_err() {
            warn!(url = target, "skipping Link header entry with invalid URL");
            continue;
        }
        for rel in relations(params) {
            let slot = match rel.to_ascii_lowercase().as_str() {
                "first" => &mut links.first,
                "next" => &mut links.next,
                "prev" | "previous" => &mut links.previous,
                "last" => &mut links.last,
                _ => continue,
            };
            *slot = Some(target.to_string());
        }
    }
    links
}

/// Split off the parameters of one entry at the first comma outside quotes.
fn split_entry(s: &str) -> (&str, &str) {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return (&s[..i], &s[i + 1..]),
            _ => {}
        }
    }
    (s, "")
}

fn relations(params: &str) -> impl Iterator<Item = &str> {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .flat_map(|(_, value)| value.trim().trim_matches('"').split_whitespace())
}
