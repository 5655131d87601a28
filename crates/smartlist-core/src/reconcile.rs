use crate::diff::plan;
use crate::host::JobHost;
use crate::progress::ApplyTracker;
use crate::resolver::Resolution;
use smartlist_models::ListDefinition;
use smartlist_sources::{ListStore, SourceError};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub added: usize,
    pub removed: usize,
    /// External add/remove calls made
    pub calls: usize,
}

impl ApplySummary {
    pub fn is_noop(&self) -> bool {
        self.calls == 0
    }
}

/// Applies a resolved target to the external list store in bounded chunks.
pub struct ReconciliationEngine<'a> {
    store: &'a dyn ListStore,
    host: &'a dyn JobHost,
    chunk_size: usize,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(store: &'a dyn ListStore, host: &'a dyn JobHost, chunk_size: usize) -> Self {
        Self {
            store,
            host,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bring the upstream list and `list.tracked` in line with `resolution`.
    ///
    /// Additions go first, then removals, one chunk at a time. `list.tracked`
    /// follows every chunk that succeeds, so a failure part way leaves it
    /// describing what the store actually holds. The roster report replaces
    /// the list's previous one only after every chunk has succeeded.
    #[instrument(skip_all, fields(list_id = %list.id))]
    pub async fn apply(
        &self,
        list: &mut ListDefinition,
        resolution: Resolution,
    ) -> Result<ApplySummary, SourceError> {
        let plan = plan(&list.tracked, &resolution.target);
        let mut tracker = ApplyTracker::new(plan.to_add.len(), plan.to_remove.len());

        if !plan.to_add.is_empty() {
            let mut progress = self.host.progress(
                list.id,
                "adding",
                plan.add_chunks(self.chunk_size).len(),
            );
            for chunk in plan.add_chunks(self.chunk_size) {
                debug!(count = chunk.len(), "Adding chunk");
                if let Err(e) = self.store.add_items(list.id, list.kind, chunk).await {
                    tracker.record_failed_chunk();
                    tracker.log_summary(&list.name);
                    progress.finish();
                    return Err(e);
                }
                list.tracked.extend(chunk.iter().map(|item| item.id));
                tracker.record_added(chunk.len());
                progress.advance();
            }
            progress.finish();
        }

        if !plan.to_remove.is_empty() {
            let mut progress = self.host.progress(
                list.id,
                "removing",
                plan.remove_chunks(self.chunk_size).len(),
            );
            for chunk in plan.remove_chunks(self.chunk_size) {
                debug!(count = chunk.len(), "Removing chunk");
                if let Err(e) = self.store.remove_items(list.id, list.kind, chunk).await {
                    tracker.record_failed_chunk();
                    tracker.log_summary(&list.name);
                    progress.finish();
                    return Err(e);
                }
                for id in chunk {
                    list.tracked.remove(id);
                }
                tracker.record_removed(chunk.len());
                progress.advance();
            }
            progress.finish();
        }

        if let Some(report) = resolution.report {
            list.roster_report = Some(report);
        }

        tracker.log_summary(&list.name);
        Ok(ApplySummary {
            added: tracker.added(),
            removed: tracker.removed(),
            calls: tracker.chunks(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{item, FakeStore, RecordingHost, StoreCall};
    use smartlist_models::{CatalogId, CatalogItem, ListKind, Owner, RosterReport};
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;

    fn list_tracking(ids: &[u64]) -> ListDefinition {
        let mut list = ListDefinition::new(3, "Tracked", ListKind::Movie, Owner::default());
        list.tracked = ids.iter().map(|&id| CatalogId(id)).collect();
        list
    }

    fn resolution(ids: &[u64]) -> Resolution {
        let target: BTreeMap<CatalogId, CatalogItem> = ids
            .iter()
            .map(|&id| (CatalogId(id), item(id, "Item", 2000)))
            .collect();
        Resolution {
            target,
            report: None,
        }
    }

    fn ids(values: &[u64]) -> Vec<CatalogId> {
        values.iter().map(|&id| CatalogId(id)).collect()
    }

    #[tokio::test]
    async fn test_adds_then_removes() {
        let store = FakeStore::default();
        let host = RecordingHost::default();
        let engine = ReconciliationEngine::new(&store, &host, 100);

        // A=1 B=2 C=3 D=4
        let mut list = list_tracking(&[1, 2, 3]);
        let summary = engine.apply(&mut list, resolution(&[2, 3, 4])).await.unwrap();

        assert_eq!(
            store.mutations(),
            vec![StoreCall::Add(ids(&[4])), StoreCall::Remove(ids(&[1]))]
        );
        assert_eq!(summary, ApplySummary { added: 1, removed: 1, calls: 2 });
        assert_eq!(list.tracked, ids(&[2, 3, 4]).into_iter().collect());
    }

    #[tokio::test]
    async fn test_second_apply_is_noop() {
        let store = FakeStore::default();
        let host = RecordingHost::default();
        let engine = ReconciliationEngine::new(&store, &host, 100);

        let mut list = list_tracking(&[1, 2, 3]);
        engine.apply(&mut list, resolution(&[2, 3, 4])).await.unwrap();
        let calls = store.mutations().len();

        let summary = engine.apply(&mut list, resolution(&[2, 3, 4])).await.unwrap();
        assert!(summary.is_noop());
        assert_eq!(store.mutations().len(), calls);
    }

    #[tokio::test]
    async fn test_chunks_cover_set_in_order() {
        let store = FakeStore::default();
        let host = RecordingHost::default();
        let engine = ReconciliationEngine::new(&store, &host, 2);

        let mut list = list_tracking(&[]);
        engine.apply(&mut list, resolution(&[1, 2, 3, 4, 5])).await.unwrap();

        let chunks: Vec<Vec<CatalogId>> = store
            .mutations()
            .into_iter()
            .map(|call| match call {
                StoreCall::Add(ids) => ids,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert!(chunks.iter().all(|chunk| chunk.len() <= 2));
        assert_eq!(chunks.concat(), ids(&[1, 2, 3, 4, 5]));
        assert_eq!(host.advances.load(Ordering::SeqCst), 3);
        assert_eq!(host.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_chunk_keeps_partial_progress_and_old_report() {
        let store = FakeStore::default();
        let host = RecordingHost::default();
        let engine = ReconciliationEngine::new(&store, &host, 2);

        let mut list = list_tracking(&[9]);
        list.roster_report = Some(RosterReport::default());
        let mut wanted = resolution(&[1, 2, 3, 4]);
        let mut new_report = RosterReport::default();
        new_report.push(smartlist_models::RosterEntry::new("X (2000)", "X (2000)"));
        wanted.report = Some(new_report);

        // An earlier pass lands, then the next add is rejected
        engine.apply(&mut list, resolution(&[1, 2, 9])).await.unwrap();
        store.fail_next_add(SourceError::InvalidArgument("bad".to_string()));
        let err = engine.apply(&mut list, wanted).await.unwrap_err();

        assert!(matches!(err, SourceError::InvalidArgument(_)));
        assert_eq!(list.tracked, ids(&[1, 2, 9]).into_iter().collect());
        assert_eq!(list.roster_report, Some(RosterReport::default()));
        assert!(!store
            .mutations()
            .iter()
            .any(|call| matches!(call, StoreCall::Remove(_))));
    }

    #[tokio::test]
    async fn test_report_stored_after_success() {
        let store = FakeStore::default();
        let host = RecordingHost::default();
        let engine = ReconciliationEngine::new(&store, &host, 100);

        let mut report = RosterReport::default();
        report.push(smartlist_models::RosterEntry::new("Dark (2017)", "Dark (2017)"));
        let mut wanted = resolution(&[5]);
        wanted.report = Some(report.clone());

        let mut list = list_tracking(&[]);
        engine.apply(&mut list, wanted).await.unwrap();
        assert_eq!(list.roster_report, Some(report));
    }
}
