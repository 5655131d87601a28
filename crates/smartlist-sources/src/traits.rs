use crate::error::SourceError;
use async_trait::async_trait;
use smartlist_models::{CatalogId, CatalogItem, FilterSet, ListDefinition, ListId, ListKind};

/// Search side of the external media catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Every item matching `filters`. Facet semantics are enforced by the catalog.
    async fn search_by_filter(
        &self,
        kind: ListKind,
        filters: &FilterSet,
    ) -> Result<Vec<CatalogItem>, SourceError>;

    /// Best match for `name` released in `year`, if any
    async fn search_by_name_and_year(
        &self,
        kind: ListKind,
        name: &str,
        year: u32,
    ) -> Result<Option<CatalogItem>, SourceError>;
}

/// Upstream list as reported by the list store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteList {
    pub id: ListId,
    pub name: String,
    pub item_count: Option<u64>,
}

/// The external store holding the materialized lists.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn fetch_list(&self, list_id: ListId) -> Result<RemoteList, SourceError>;

    async fn add_items(
        &self,
        list_id: ListId,
        kind: ListKind,
        items: &[CatalogItem],
    ) -> Result<(), SourceError>;

    async fn remove_items(
        &self,
        list_id: ListId,
        kind: ListKind,
        items: &[CatalogId],
    ) -> Result<(), SourceError>;

    /// Push name and description upstream
    async fn update_list(&self, list: &ListDefinition) -> Result<(), SourceError>;
}
