// Filter value types for smart-list membership.
//
// Every token facet is the same `TokenFilter<F>` parameterized by a zero-sized
// facet marker; scalar bounds share `Interval`. `FilterSet` composes them.

use crate::media::ItemFacets;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    Genre,
    Language,
    Translation,
    Country,
    Certification,
    Network,
    Status,
}

impl FacetKind {
    /// Catalog query parameter carrying this facet
    pub fn query_key(&self) -> &'static str {
        match self {
            FacetKind::Genre => "genres",
            FacetKind::Language => "languages",
            FacetKind::Translation => "translations",
            FacetKind::Country => "countries",
            FacetKind::Certification => "certifications",
            FacetKind::Network => "networks",
            FacetKind::Status => "status",
        }
    }
}

/// Marker for a facet vocabulary.
pub trait Facet: fmt::Debug + Clone + Copy + Default + PartialEq + Eq + Send + Sync + 'static {
    const KIND: FacetKind;
}

macro_rules! facet_marker {
    ($(#[$doc:meta])* $name:ident => $kind:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Facet for $name {
            const KIND: FacetKind = FacetKind::$kind;
        }
    };
}

facet_marker!(/// Genre slugs (`action`, `drama`, ...)
    Genre => Genre);
facet_marker!(/// ISO 639-1 original language codes
    Language => Language);
facet_marker!(/// ISO 639-1 codes of available translations
    Translation => Translation);
facet_marker!(/// ISO 3166-1 country codes
    Country => Country);
facet_marker!(/// Certification slugs; movies and shows share the token type
    Certification => Certification);
facet_marker!(/// Broadcasting networks (shows only)
    Network => Network);
facet_marker!(/// Production status (`returning series`, `ended`, ...; shows only)
    Status => Status);

/// Set of accepted tokens for one facet. Empty means "no constraint".
///
/// Tokens are trimmed and compared case-insensitively, so equality is set
/// equality regardless of input order, case or duplicates. The first spelling
/// of each token is kept for the catalog query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>", bound = "")]
pub struct TokenFilter<F: Facet> {
    tokens: BTreeMap<String, String>,
    facet: PhantomData<F>,
}

impl<F: Facet> TokenFilter<F> {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeMap::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if !token.is_empty() {
                set.entry(token.to_lowercase()).or_insert_with(|| token.to_string());
            }
        }
        Self {
            tokens: set,
            facet: PhantomData,
        }
    }

    pub fn kind(&self) -> FacetKind {
        F::KIND
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(&token.trim().to_lowercase())
    }

    /// Tokens as first spelled, ordered case-insensitively
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.values().map(|t| t.as_str())
    }

    /// True when the facet is unconstrained or any of `values` is accepted.
    pub fn matches(&self, values: &[String]) -> bool {
        self.is_empty() || values.iter().any(|v| self.contains(v))
    }

    /// Comma-joined query value, `None` when unconstrained
    pub fn to_query(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.tokens().collect::<Vec<_>>().join(","))
        }
    }
}

impl<F: Facet> PartialEq for TokenFilter<F> {
    fn eq(&self, other: &Self) -> bool {
        self.tokens.keys().eq(other.tokens.keys())
    }
}

impl<F: Facet> Eq for TokenFilter<F> {}

impl<F: Facet> From<Vec<String>> for TokenFilter<F> {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl<F: Facet> From<TokenFilter<F>> for Vec<String> {
    fn from(filter: TokenFilter<F>) -> Self {
        filter.tokens.into_values().collect()
    }
}

impl<F: Facet, S: AsRef<str>> FromIterator<S> for TokenFilter<F> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("invalid bound '{0}'")]
    InvalidBound(String),
    #[error("lower bound {min} exceeds upper bound {max}")]
    Inverted { min: u32, max: u32 },
}

/// Inclusive scalar range; either bound may be open.
///
/// Written in the catalog's `"min-max"` notation: `"1990-2000"`, `"1990-"`,
/// `"-2000"`, or a single value for an exact match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl Interval {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Result<Self, IntervalParseError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(IntervalParseError::Inverted { min, max });
            }
        }
        Ok(Self { min, max })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Inclusive containment. An unknown value only passes an unbounded interval.
    pub fn contains(&self, value: Option<u32>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    pub fn to_query(&self) -> Option<String> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.min.map(|v| v.to_string()).unwrap_or_default();
        let max = self.max.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}-{}", min, max)
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn bound(raw: &str) -> Result<Option<u32>, IntervalParseError> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|_| IntervalParseError::InvalidBound(raw.to_string()))
        }

        let s = s.trim();
        match s.split_once('-') {
            Some((min, max)) => Interval::new(bound(min)?, bound(max)?),
            None => {
                let exact = bound(s)?;
                Interval::new(exact, exact)
            }
        }
    }
}

/// Which text fields the catalog matches `query` against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    #[serde(default)]
    pub title: bool,
    #[serde(default)]
    pub tagline: bool,
    #[serde(default)]
    pub overview: bool,
    #[serde(default)]
    pub people: bool,
    #[serde(default)]
    pub translations: bool,
    #[serde(default)]
    pub aliases: bool,
    #[serde(default)]
    pub name: bool,
    #[serde(default)]
    pub biography: bool,
    #[serde(default)]
    pub description: bool,
}

impl SearchScope {
    /// Catalog field names for the enabled flags
    pub fn fields(&self) -> Vec<&'static str> {
        [
            (self.title, "title"),
            (self.tagline, "tagline"),
            (self.overview, "overview"),
            (self.people, "people"),
            (self.translations, "translations"),
            (self.aliases, "aliases"),
            (self.name, "name"),
            (self.biography, "biography"),
            (self.description, "description"),
        ]
        .into_iter()
        .filter_map(|(enabled, field)| enabled.then_some(field))
        .collect()
    }
}

/// Inclusion criteria for a smart list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub scope: SearchScope,
    #[serde(default)]
    pub genres: TokenFilter<Genre>,
    #[serde(default)]
    pub languages: TokenFilter<Language>,
    #[serde(default)]
    pub translations: TokenFilter<Translation>,
    #[serde(default)]
    pub countries: TokenFilter<Country>,
    #[serde(default)]
    pub certifications: TokenFilter<Certification>,
    #[serde(default)]
    pub networks: TokenFilter<Network>,
    #[serde(default)]
    pub statuses: TokenFilter<Status>,
    #[serde(default)]
    pub years: Interval,
    #[serde(default)]
    pub runtimes: Interval,
    #[serde(default)]
    pub ratings: Interval,
}

impl FilterSet {
    /// Non-empty token facets as `(query key, joined tokens)` pairs.
    pub fn facet_params(&self) -> Vec<(&'static str, String)> {
        [
            (FacetKind::Genre, self.genres.to_query()),
            (FacetKind::Language, self.languages.to_query()),
            (FacetKind::Translation, self.translations.to_query()),
            (FacetKind::Country, self.countries.to_query()),
            (FacetKind::Certification, self.certifications.to_query()),
            (FacetKind::Network, self.networks.to_query()),
            (FacetKind::Status, self.statuses.to_query()),
        ]
        .into_iter()
        .filter_map(|(kind, value)| value.map(|v| (kind.query_key(), v)))
        .collect()
    }

    /// Range bounds as `(query key, "min-max")` pairs.
    pub fn range_params(&self) -> Vec<(&'static str, String)> {
        [
            ("years", self.years.to_query()),
            ("runtimes", self.runtimes.to_query()),
            ("ratings", self.ratings.to_query()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }

    /// True when no facet or bound constrains membership.
    /// Text search is not considered.
    pub fn is_unconstrained(&self) -> bool {
        self.genres.is_empty()
            && self.languages.is_empty()
            && self.translations.is_empty()
            && self.countries.is_empty()
            && self.certifications.is_empty()
            && self.networks.is_empty()
            && self.statuses.is_empty()
            && self.years.is_unbounded()
            && self.runtimes.is_unbounded()
            && self.ratings.is_unbounded()
    }

    /// Logical AND across every non-empty facet and every bound.
    ///
    /// The free-text query is evaluated by the catalog only and is ignored here.
    pub fn matches(&self, item: &ItemFacets) -> bool {
        self.genres.matches(item.values(FacetKind::Genre))
            && self.languages.matches(item.values(FacetKind::Language))
            && self.translations.matches(item.values(FacetKind::Translation))
            && self.countries.matches(item.values(FacetKind::Country))
            && self.certifications.matches(item.values(FacetKind::Certification))
            && self.networks.matches(item.values(FacetKind::Network))
            && self.statuses.matches(item.values(FacetKind::Status))
            && self.years.contains(item.year)
            && self.runtimes.contains(item.runtime)
            && self.ratings.contains(item.rating)
    }
}
