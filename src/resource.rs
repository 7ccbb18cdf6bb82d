//! The generic service every resource is served through.

use std::marker::PhantomData;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::BaseClient;
use crate::context::Context;
use crate::error::Result;
use crate::pagination::{decode_list, List};
use crate::request::RequestEnvelope;
use crate::response::{decode, decode_empty, ResponseMeta};

/// Describes one REST collection: where it lives and what it exchanges.
pub trait Resource {
    /// Collection path relative to the base URL, e.g. `/clients`.
    const PATH: &'static str;
    /// Key holding the items in a list response, e.g. `clients`.
    const COLLECTION_KEY: &'static str;

    type Entity: DeserializeOwned + Send + Sync;
    type ListOptions: Serialize + Sync;
    type CreateRequest: Serialize + Sync;
    type UpdateRequest: Serialize + Sync;
}

/// List/Get/Create/Update/Delete for one resource.
///
/// Obtained from [`HarvestClient`](crate::HarvestClient) accessors such as
/// [`clients()`](crate::HarvestClient::clients). Every call returns the
/// decoded value together with the [`ResponseMeta`] of the exchange.
pub struct ResourceClient<'a, R> {
    base: &'a BaseClient,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource> ResourceClient<'a, R> {
    pub(crate) fn new(base: &'a BaseClient) -> Self {
        Self {
            base,
            _resource: PhantomData,
        }
    }

    fn item_path(id: i64) -> String {
        format!("{}/{id}", R::PATH)
    }

    /// Fetch one page of the collection.
    ///
    /// Only the populated fields of `options` are sent as query parameters.
    pub async fn list(
        &self,
        ctx: &Context,
        options: &R::ListOptions,
    ) -> Result<(List<R::Entity>, ResponseMeta)> {
        let request = self
            .base
            .request::<_, ()>(Method::GET, R::PATH, Some(options), None)?;
        self.fetch_page(ctx, request).await
    }

    /// Fetch the page after `page`.
    ///
    /// The `next` link is followed when there is one. Otherwise, when the
    /// metadata names a `next_page`, the URL `page` was fetched from is
    /// requested again with that page number. Returns `Ok(None)` exactly
    /// when [`Pagination::has_next`](crate::Pagination::has_next) is false.
    pub async fn next_page(
        &self,
        ctx: &Context,
        page: &List<R::Entity>,
    ) -> Result<Option<(List<R::Entity>, ResponseMeta)>> {
        let request = match (page.pagination.next_link(), page.pagination.next_page) {
            (Some(link), _) => self.base.follow(link)?,
            (None, Some(number)) => self.numbered_page(page, number)?,
            (None, None) => return Ok(None),
        };
        self.fetch_page(ctx, request).await.map(Some)
    }

    async fn fetch_page(
        &self,
        ctx: &Context,
        request: RequestEnvelope,
    ) -> Result<(List<R::Entity>, ResponseMeta)> {
        let url = request.url.clone();
        let raw = self.base.send(ctx, request).await?;
        let (mut list, meta) = decode_list(&raw, R::COLLECTION_KEY)?;
        list.url = Some(url);
        Ok((list, meta))
    }

    /// Request for page `number` of the listing `page` came from, keeping its
    /// filters. `per_page` is pinned to the size the server reported.
    fn numbered_page(&self, page: &List<R::Entity>, number: u32) -> Result<RequestEnvelope> {
        let mut url = match &page.url {
            Some(url) => url.clone(),
            None => {
                self.base
                    .request::<(), ()>(Method::GET, R::PATH, None, None)?
                    .url
            }
        };
        let per_page = page.pagination.per_page;

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "page" && !(key == "per_page" && per_page.is_some()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        pairs.push(("page".to_string(), number.to_string()));
        if let Some(per_page) = per_page {
            pairs.push(("per_page".to_string(), per_page.to_string()));
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        url.query_pairs_mut().clear().extend_pairs(pairs);

        self.base.follow(url.as_str())
    }

    pub async fn get(&self, ctx: &Context, id: i64) -> Result<(R::Entity, ResponseMeta)> {
        let request =
            self.base
                .request::<(), ()>(Method::GET, &Self::item_path(id), None, None)?;
        let raw = self.base.send(ctx, request).await?;
        decode(&raw)
    }

    pub async fn create(
        &self,
        ctx: &Context,
        create: &R::CreateRequest,
    ) -> Result<(R::Entity, ResponseMeta)> {
        let request = self
            .base
            .request::<(), _>(Method::POST, R::PATH, None, Some(create))?;
        let raw = self.base.send(ctx, request).await?;
        decode(&raw)
    }

    /// Partially update an entity; unset fields are left untouched.
    pub async fn update(
        &self,
        ctx: &Context,
        id: i64,
        update: &R::UpdateRequest,
    ) -> Result<(R::Entity, ResponseMeta)> {
        let request = self.base.request::<(), _>(
            Method::PATCH,
            &Self::item_path(id),
            None,
            Some(update),
        )?;
        let raw = self.base.send(ctx, request).await?;
        decode(&raw)
    }

    pub async fn delete(&self, ctx: &Context, id: i64) -> Result<ResponseMeta> {
        let request =
            self.base
                .request::<(), ()>(Method::DELETE, &Self::item_path(id), None, None)?;
        let raw = self.base.send(ctx, request).await?;
        decode_empty(&raw)
    }
}
