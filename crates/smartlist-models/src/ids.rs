use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a smart list, shared by the local record and the upstream list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub u64);

/// Catalog identity of a movie or show (the Trakt numeric id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ListId)
    }
}

impl From<u64> for ListId {
    fn from(id: u64) -> Self {
        ListId(id)
    }
}

impl From<u64> for CatalogId {
    fn from(id: u64) -> Self {
        CatalogId(id)
    }
}
