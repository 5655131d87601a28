use regex::Regex;
use smartlist_models::{CatalogId, CatalogItem, ListDefinition, RosterEntry, RosterReport};
use smartlist_sources::{CatalogService, SourceError};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

static ROSTER_LINE: OnceLock<Regex> = OnceLock::new();

/// Split a roster line of the form `Title (YYYY)` into title and year.
///
/// Returns `None` for lines that do not carry a four digit year in
/// parentheses or whose title is blank.
pub fn parse_roster_line(line: &str) -> Option<(String, u32)> {
    let re = ROSTER_LINE
        .get_or_init(|| Regex::new(r"^(.*)\(([0-9]{4})\)").expect("roster line pattern is valid"));
    let captures = re.captures(line.trim())?;
    let title = captures.get(1)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    let year = captures.get(2)?.as_str().parse().ok()?;
    Some((title.to_string(), year))
}

/// Target membership for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub target: BTreeMap<CatalogId, CatalogItem>,
    /// Present only in manual mode
    pub report: Option<RosterReport>,
}

pub struct CandidateResolver<'a> {
    catalog: &'a dyn CatalogService,
    lookup_delay: Duration,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogService, lookup_delay: Duration) -> Self {
        Self {
            catalog,
            lookup_delay,
        }
    }

    pub async fn resolve(&self, list: &ListDefinition) -> Result<Resolution, SourceError> {
        match list.manual_roster() {
            Some(roster) => self.resolve_roster(list, roster).await,
            None => self.resolve_filters(list).await,
        }
    }

    async fn resolve_filters(&self, list: &ListDefinition) -> Result<Resolution, SourceError> {
        let found = self.catalog.search_by_filter(list.kind, &list.filters).await?;
        let found_count = found.len();
        let reverse = list.effective_reverse_filters();

        let mut target = BTreeMap::new();
        let mut excluded = 0usize;
        for item in found {
            if reverse.is_some_and(|filters| filters.matches(&item.facets)) {
                excluded += 1;
                continue;
            }
            target.insert(item.id, item);
        }

        info!(
            list_id = %list.id,
            found = found_count,
            excluded,
            target = target.len(),
            "Resolved list from filters"
        );
        Ok(Resolution {
            target,
            report: None,
        })
    }

    /// Lookups run one at a time with a pause after each.
    async fn resolve_roster(
        &self,
        list: &ListDefinition,
        roster: &str,
    ) -> Result<Resolution, SourceError> {
        let mut target = BTreeMap::new();
        let mut report = RosterReport::default();
        let mut skipped = 0usize;

        for line in roster.lines() {
            let Some((title, year)) = parse_roster_line(line) else {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
                continue;
            };

            let found = self
                .catalog
                .search_by_name_and_year(list.kind, &title, year)
                .await;
            tokio::time::sleep(self.lookup_delay).await;

            match found? {
                Some(item) => {
                    report.push(RosterEntry::new(line.trim(), item.canonical_label()));
                    target.insert(item.id, item);
                }
                None => debug!(list_id = %list.id, title = %title, year, "No catalog match"),
            }
        }

        info!(
            list_id = %list.id,
            matched = report.len(),
            mismatched = report.mismatches().count(),
            skipped,
            "Resolved manual roster"
        );
        Ok(Resolution {
            target,
            report: Some(report),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{item, FakeCatalog};
    use smartlist_models::{
        FilterSet, Genre, ItemFacets, ListKind, Owner, RosterMatch, TokenFilter,
    };

    fn list(privileged: bool) -> ListDefinition {
        ListDefinition::new(
            1,
            "Shows",
            ListKind::Show,
            Owner {
                username: "alice".to_string(),
                is_privileged: privileged,
            },
        )
    }

    fn genre_item(id: u64, genre: &str) -> CatalogItem {
        item(id, "Genre item", 2000).with_facets(ItemFacets {
            genres: vec![genre.to_string()],
            ..ItemFacets::default()
        })
    }

    fn horror_reverse() -> FilterSet {
        FilterSet {
            genres: TokenFilter::<Genre>::new(["horror"]),
            ..FilterSet::default()
        }
    }

    #[test]
    fn test_parse_roster_line() {
        assert_eq!(
            parse_roster_line("Breaking Bad (2008)"),
            Some(("Breaking Bad".to_string(), 2008))
        );
        assert_eq!(
            parse_roster_line("  Blade Runner 2049 (2017)  \r"),
            Some(("Blade Runner 2049".to_string(), 2017))
        );
        assert_eq!(parse_roster_line("Breaking Bad"), None);
        assert_eq!(parse_roster_line("Breaking Bad (08)"), None);
        assert_eq!(parse_roster_line("Breaking Bad (20O8)"), None);
        assert_eq!(parse_roster_line("(2008)"), None);
    }

    #[tokio::test]
    async fn test_filter_mode_returns_catalog_results() {
        let catalog = FakeCatalog::with_results(vec![item(1, "A", 2001), item(2, "B", 2002)]);
        let resolver = CandidateResolver::new(&catalog, Duration::ZERO);

        let resolution = resolver.resolve(&list(false)).await.unwrap();
        assert_eq!(resolution.target.len(), 2);
        assert!(resolution.report.is_none());
        assert!(catalog.lookup_names().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_filters_exclude_matches_for_privileged_owner() {
        let catalog =
            FakeCatalog::with_results(vec![genre_item(1, "drama"), genre_item(2, "horror")]);
        let resolver = CandidateResolver::new(&catalog, Duration::ZERO);

        let mut privileged = list(true);
        privileged.reverse_filters = Some(horror_reverse());
        let resolution = resolver.resolve(&privileged).await.unwrap();
        assert_eq!(
            resolution.target.keys().copied().collect::<Vec<_>>(),
            vec![CatalogId(1)]
        );

        let mut regular = list(false);
        regular.reverse_filters = Some(horror_reverse());
        let resolution = resolver.resolve(&regular).await.unwrap();
        assert_eq!(resolution.target.len(), 2);
    }

    #[tokio::test]
    async fn test_manual_roster_report() {
        let catalog = FakeCatalog::with_titles(vec![
            ("Breaking Bad", 2008, item(10, "Breaking Bad", 2008)),
            ("The Wire", 2004, item(11, "The Wire", 2003)),
        ]);
        let resolver = CandidateResolver::new(&catalog, Duration::ZERO);

        let mut manual = list(false);
        manual.roster = Some("Breaking Bad (2008)\nnot a roster line\nThe Wire (2004)\nLost (2004)\n".to_string());
        manual.filters.genres = TokenFilter::new(["drama"]);

        let resolution = resolver.resolve(&manual).await.unwrap();
        let report = resolution.report.unwrap();
        assert_eq!(
            report.lines(),
            vec![
                "Breaking Bad (2008) == Breaking Bad (2008)".to_string(),
                "The Wire (2004) != The Wire (2003)".to_string(),
            ]
        );
        assert_eq!(report.entries[1].outcome, RosterMatch::Differs);
        assert_eq!(resolution.target.len(), 2);
        assert_eq!(catalog.filter_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(catalog.lookup_names().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_roster_lines_collapse_in_target() {
        let catalog =
            FakeCatalog::with_titles(vec![("Dark", 2017, item(5, "Dark", 2017))]);
        let resolver = CandidateResolver::new(&catalog, Duration::ZERO);

        let mut manual = list(false);
        manual.roster = Some("Dark (2017)\nDark (2017)".to_string());
        let resolution = resolver.resolve(&manual).await.unwrap();
        assert_eq!(resolution.target.len(), 1);
        assert_eq!(resolution.report.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_lookups_are_paced() {
        let catalog = FakeCatalog::with_titles(vec![("Dark", 2017, item(5, "Dark", 2017))]);
        let resolver = CandidateResolver::new(&catalog, Duration::from_secs(1));

        let mut manual = list(false);
        manual.roster = Some("Dark (2017)\nMissing (1999)\nskip me\nDark (2017)".to_string());

        let start = tokio::time::Instant::now();
        resolver.resolve(&manual).await.unwrap();

        let lookups = catalog.lookups.lock().unwrap().clone();
        assert_eq!(lookups.len(), 3);
        for pair in lookups.windows(2) {
            assert!(pair[1].2 - pair[0].2 >= Duration::from_secs(1));
        }
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
