use crate::filter::FacetKind;
use crate::ids::CatalogId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ListKind {
    Movie,
    Show,
}

impl ListKind {
    /// Catalog path segment for this kind ("movie" / "show")
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Movie => "movie",
            ListKind::Show => "show",
        }
    }
}

/// A movie or show as returned by the catalog.
///
/// `facets` is only populated when the catalog was asked for extended info
/// (filter searches); title lookups leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: CatalogId,
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub facets: ItemFacets,
}

impl CatalogItem {
    pub fn new(id: impl Into<CatalogId>, title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year,
            facets: ItemFacets::default(),
        }
    }

    pub fn with_facets(mut self, facets: ItemFacets) -> Self {
        self.facets = facets;
        self
    }

    /// `"Title (Year)"`, the form roster lines are written in.
    /// An unknown year renders as empty parentheses.
    pub fn canonical_label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => format!("{} ()", self.title),
        }
    }
}

/// Attributes of a candidate item that filter facets are evaluated against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemFacets {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub translations: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    pub year: Option<u32>,
    /// Minutes
    pub runtime: Option<u32>,
    /// Catalog rating on a 0-100 scale
    pub rating: Option<u32>,
}

impl ItemFacets {
    pub fn values(&self, kind: FacetKind) -> &[String] {
        match kind {
            FacetKind::Genre => &self.genres,
            FacetKind::Language => &self.languages,
            FacetKind::Translation => &self.translations,
            FacetKind::Country => &self.countries,
            FacetKind::Certification => &self.certifications,
            FacetKind::Network => &self.networks,
            FacetKind::Status => &self.statuses,
        }
    }
}
