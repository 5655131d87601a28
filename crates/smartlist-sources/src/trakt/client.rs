use crate::error::SourceError;
use crate::traits::{CatalogService, ListStore, RemoteList};
use crate::trakt::api::{self, TraktList, TraktSearchResult, PAGE_LIMIT};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use smartlist_config::TraktConfig;
use smartlist_models::{CatalogId, CatalogItem, FilterSet, ListDefinition, ListId, ListKind};
use std::sync::Arc;
use tracing::{debug, warn};

/// Safety cap on search pagination
const MAX_SEARCH_PAGES: u32 = 200;

/// Trakt-backed catalog and list store.
#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    base_url: String,
    client_id: String,
    access_token: String,
    encoded_username: String,
}

impl TraktClient {
    pub fn new(config: &TraktConfig) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
            encoded_username: urlencoding::encode(&config.username).to_string(),
        }
    }

    fn list_url(&self, list_id: ListId) -> String {
        format!("{}/users/{}/lists/{}", self.base_url, self.encoded_username, list_id)
    }

    async fn search_page(
        &self,
        kind: ListKind,
        params: &[(&str, String)],
        page: u32,
    ) -> Result<(Vec<TraktSearchResult>, u32), SourceError> {
        let url = format!("{}/search/{}", self.base_url, kind.as_str());
        let request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("page", page.to_string()), ("limit", PAGE_LIMIT.to_string())]);
        let response = api::check(
            api::with_headers(request, &self.access_token, &self.client_id)
                .send()
                .await?,
        )
        .await?;
        let pages = api::page_count(&response);
        let results: Vec<TraktSearchResult> = response.json().await?;
        Ok((results, pages))
    }

    async fn post_items(&self, url: String, body: serde_json::Value) -> Result<(), SourceError> {
        let request = self.client.post(&url).json(&body);
        api::check(
            api::with_headers(request, &self.access_token, &self.client_id)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

fn filter_params(filters: &FilterSet) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !filters.query.trim().is_empty() {
        params.push(("query", filters.query.trim().to_string()));
    }
    let fields = filters.scope.fields();
    if !fields.is_empty() {
        params.push(("fields", fields.join(",")));
    }
    params.extend(filters.facet_params());
    params.extend(filters.range_params());
    params.push(("extended", "full".to_string()));
    params
}

#[async_trait]
impl CatalogService for TraktClient {
    async fn search_by_filter(
        &self,
        kind: ListKind,
        filters: &FilterSet,
    ) -> Result<Vec<CatalogItem>, SourceError> {
        let params = filter_params(filters);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let (results, pages) = self.search_page(kind, &params, page).await?;
            debug!(kind = kind.as_str(), page, pages, results = results.len(), "Catalog search page");
            items.extend(
                results
                    .into_iter()
                    .filter_map(|r| r.into_media(kind))
                    .map(|m| m.into_catalog_item()),
            );

            if page >= pages {
                break;
            }
            if page >= MAX_SEARCH_PAGES {
                warn!(kind = kind.as_str(), pages, "Catalog search truncated at {} pages", MAX_SEARCH_PAGES);
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    async fn search_by_name_and_year(
        &self,
        kind: ListKind,
        name: &str,
        year: u32,
    ) -> Result<Option<CatalogItem>, SourceError> {
        let params = [
            ("query", name.to_string()),
            ("fields", "title".to_string()),
            ("years", year.to_string()),
        ];
        let (results, _) = self.search_page(kind, &params, 1).await?;
        Ok(results
            .into_iter()
            .filter_map(|r| r.into_media(kind))
            .map(|m| m.into_catalog_item())
            .next())
    }
}

#[async_trait]
impl ListStore for TraktClient {
    async fn fetch_list(&self, list_id: ListId) -> Result<RemoteList, SourceError> {
        let request = self.client.get(self.list_url(list_id));
        let response = api::check(
            api::with_headers(request, &self.access_token, &self.client_id)
                .send()
                .await?,
        )
        .await?;
        let list: TraktList = response.json().await?;
        Ok(RemoteList {
            id: ListId(list.ids.trakt),
            name: list.name,
            item_count: list.item_count,
        })
    }

    async fn add_items(
        &self,
        list_id: ListId,
        kind: ListKind,
        items: &[CatalogItem],
    ) -> Result<(), SourceError> {
        let body = api::items_payload(kind, items.iter().map(|item| item.id));
        self.post_items(format!("{}/items", self.list_url(list_id)), body).await
    }

    async fn remove_items(
        &self,
        list_id: ListId,
        kind: ListKind,
        items: &[CatalogId],
    ) -> Result<(), SourceError> {
        let body = api::items_payload(kind, items.iter().copied());
        self.post_items(format!("{}/items/remove", self.list_url(list_id)), body).await
    }

    async fn update_list(&self, list: &ListDefinition) -> Result<(), SourceError> {
        let body = json!({
            "name": list.name,
            "description": list.description.clone().unwrap_or_default(),
        });
        let request = self.client.put(self.list_url(list.id)).json(&body);
        api::check(
            api::with_headers(request, &self.access_token, &self.client_id)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}
