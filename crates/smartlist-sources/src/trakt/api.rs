use crate::error::SourceError;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use smartlist_models::{CatalogId, CatalogItem, ItemFacets, ListKind};
use std::time::Duration;

pub const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktIds {
    pub trakt: u64,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<u32>,
    pub tvdb: Option<u32>,
}

/// Movie or show payload (`extended=full` fills the optional fields)
#[derive(Debug, Deserialize)]
pub struct TraktMedia {
    pub title: Option<String>,
    pub year: Option<u32>,
    pub ids: TraktIds,
    #[serde(default)]
    pub genres: Vec<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub available_translations: Vec<String>,
    pub country: Option<String>,
    pub certification: Option<String>,
    pub network: Option<String>,
    pub status: Option<String>,
    pub runtime: Option<u32>,
    /// 0-10
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TraktSearchResult {
    #[serde(rename = "type")]
    pub item_type: String,
    pub movie: Option<TraktMedia>,
    pub show: Option<TraktMedia>,
}

#[derive(Debug, Deserialize)]
pub struct TraktListIds {
    pub trakt: u64,
}

#[derive(Debug, Deserialize)]
pub struct TraktList {
    pub name: String,
    pub item_count: Option<u64>,
    pub ids: TraktListIds,
}

impl TraktMedia {
    pub fn into_catalog_item(self) -> CatalogItem {
        let facets = ItemFacets {
            genres: self.genres,
            languages: self.language.into_iter().collect(),
            translations: self.available_translations,
            countries: self.country.into_iter().collect(),
            certifications: self.certification.into_iter().collect(),
            networks: self.network.into_iter().collect(),
            statuses: self.status.into_iter().collect(),
            year: self.year,
            runtime: self.runtime,
            rating: self.rating.map(|r| (r * 10.0).round().clamp(0.0, 100.0) as u32),
        };
        CatalogItem {
            id: CatalogId(self.ids.trakt),
            title: self.title.unwrap_or_default(),
            year: self.year,
            facets,
        }
    }
}

impl TraktSearchResult {
    /// The payload matching `kind`, ignoring results of the other type
    pub fn into_media(self, kind: ListKind) -> Option<TraktMedia> {
        match kind {
            ListKind::Movie => self.movie,
            ListKind::Show => self.show,
        }
    }
}

/// Collection key in list item payloads
fn collection_key(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Movie => "movies",
        ListKind::Show => "shows",
    }
}

/// Body for `/lists/{id}/items` and `/lists/{id}/items/remove`
pub fn items_payload(kind: ListKind, ids: impl IntoIterator<Item = CatalogId>) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = ids
        .into_iter()
        .map(|id| json!({ "ids": { "trakt": id.0 } }))
        .collect();
    json!({ collection_key(kind): entries })
}

pub fn with_headers(builder: RequestBuilder, access_token: &str, client_id: &str) -> RequestBuilder {
    builder
        .header("Authorization", format!("Bearer {}", access_token))
        .header("trakt-api-version", "2")
        .header("trakt-api-key", client_id)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
}

/// Pass successful responses through, map the rest to `SourceError`.
pub async fn check(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::from_status(status.as_u16(), body, retry_after))
}

/// Total pages advertised by a paginated response (1 when absent)
pub fn page_count(response: &Response) -> u32 {
    response
        .headers()
        .get("X-Pagination-Page-Count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}
