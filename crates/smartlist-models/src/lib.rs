pub mod filter;
pub mod ids;
pub mod list;
pub mod media;
pub mod report;

pub use filter::{
    Certification, Country, Facet, FacetKind, FilterSet, Genre, Interval, IntervalParseError,
    Language, Network, SearchScope, Status, TokenFilter, Translation,
};
pub use ids::{CatalogId, ListId};
pub use list::{ListDefinition, Owner, ScanState};
pub use media::{CatalogItem, ItemFacets, ListKind};
pub use report::{RosterEntry, RosterMatch, RosterReport};
