use crate::error::PassError;
use crate::host::{JobHost, PassOptions};
use crate::reconcile::{ApplySummary, ReconciliationEngine};
use crate::recovery::RecoveryAction;
use crate::repository::ListRepository;
use crate::requeue::RequeueScheduler;
use crate::resolver::CandidateResolver;
use crate::state::ProcessingLease;
use smartlist_config::EngineConfig;
use smartlist_models::{ListDefinition, ListId};
use smartlist_sources::{CatalogService, ListStore};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(ApplySummary),
    /// Upstream list vanished, local record removed
    Deleted,
    /// Auth failure, `process` set to false
    Paused,
    /// Benign failure, nothing changed this cycle
    Ignored,
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassOutcome::Completed(summary) => write!(
                f,
                "completed (+{} / -{} in {} calls)",
                summary.added, summary.removed, summary.calls
            ),
            PassOutcome::Deleted => f.write_str("deleted"),
            PassOutcome::Paused => f.write_str("paused"),
            PassOutcome::Ignored => f.write_str("ignored"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub list_id: ListId,
    pub outcome: PassOutcome,
}

/// Runs one processing pass for a list: resolve, reconcile, persist, recover.
pub struct ListProcessor {
    catalog: Arc<dyn CatalogService>,
    store: Arc<dyn ListStore>,
    repository: Arc<dyn ListRepository>,
    host: Arc<dyn JobHost>,
    engine: EngineConfig,
    requeue: RequeueScheduler,
}

impl ListProcessor {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        store: Arc<dyn ListStore>,
        repository: Arc<dyn ListRepository>,
        host: Arc<dyn JobHost>,
        engine: EngineConfig,
    ) -> Self {
        let requeue = RequeueScheduler::new(engine.requeue_delay());
        Self {
            catalog,
            store,
            repository,
            host,
            engine,
            requeue,
        }
    }

    /// Process `list_id` once, then schedule the next cycle if asked to.
    ///
    /// Only unclassified failures come back as `Err`; the list is returned
    /// to `None` before that happens.
    #[instrument(skip(self), fields(list_id = %list_id))]
    pub async fn process(
        &self,
        list_id: ListId,
        options: PassOptions,
    ) -> Result<PassSummary, PassError> {
        let result = self.process_once(list_id, options).await;
        if options.queue_next {
            self.requeue.schedule_next(self.host.as_ref()).await;
        }
        result.map(|outcome| PassSummary { list_id, outcome })
    }

    async fn process_once(
        &self,
        list_id: ListId,
        options: PassOptions,
    ) -> Result<PassOutcome, PassError> {
        let mut lease = match ProcessingLease::acquire(self.repository.as_ref(), list_id).await {
            Ok(lease) => lease,
            Err(e) if RecoveryAction::for_failure(e.kind()) == RecoveryAction::DeleteList => {
                warn!("List could not be loaded, deleting record: {}", e);
                self.repository
                    .delete(&ListDefinition::stub(list_id))
                    .await?;
                return Ok(PassOutcome::Deleted);
            }
            Err(e) => return Err(e),
        };

        let failure = match self.run_pass(&mut lease).await {
            Ok(summary) => {
                self.finish(lease, options).await?;
                return Ok(PassOutcome::Completed(summary));
            }
            Err(e) => e,
        };

        match RecoveryAction::for_failure(failure.kind()) {
            RecoveryAction::DeleteList => {
                warn!("Upstream list no longer exists, deleting: {}", failure);
                let list = lease.forfeit();
                self.repository.delete(&list).await?;
                Ok(PassOutcome::Deleted)
            }
            RecoveryAction::PauseList => {
                warn!("Access to upstream list denied, pausing: {}", failure);
                lease.list_mut().process = false;
                self.finish(lease, options).await?;
                Ok(PassOutcome::Paused)
            }
            RecoveryAction::Ignore => {
                info!("Ignoring failure for this cycle: {}", failure);
                self.finish(lease, options).await?;
                Ok(PassOutcome::Ignored)
            }
            RecoveryAction::Propagate => {
                error!("Processing failed: {}", failure);
                if let Err(e) = self.finish(lease, options).await {
                    warn!("Cleanup after failed pass also failed: {}", e);
                }
                Err(failure)
            }
        }
    }

    async fn run_pass(&self, lease: &mut ProcessingLease<'_>) -> Result<ApplySummary, PassError> {
        let list_id = lease.list().id;
        let remote = self.store.fetch_list(list_id).await?;
        debug!(remote_name = %remote.name, items = ?remote.item_count, "Upstream list found");

        let resolver = CandidateResolver::new(self.catalog.as_ref(), self.engine.lookup_delay());
        let resolution = resolver.resolve(lease.list()).await?;

        let engine = ReconciliationEngine::new(
            self.store.as_ref(),
            self.host.as_ref(),
            self.engine.chunk_size,
        );
        let summary = engine.apply(lease.list_mut(), resolution).await?;
        self.repository.update(lease.list()).await?;
        Ok(summary)
    }

    async fn finish(&self, lease: ProcessingLease<'_>, options: PassOptions) -> Result<(), PassError> {
        if options.force_refresh {
            match self.store.update_list(lease.list()).await {
                Ok(()) => debug!("Upstream list metadata refreshed"),
                Err(e) => warn!("Failed to refresh upstream list metadata: {}", e),
            }
        }
        lease.release().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        item, FakeCatalog, FakeStore, RecordingHost, RecordingRepository, StoreCall,
    };
    use smartlist_models::{CatalogId, ListKind, Owner, ScanState};
    use smartlist_sources::SourceError;
    use std::time::Duration;

    struct Harness {
        catalog: Arc<FakeCatalog>,
        store: Arc<FakeStore>,
        repository: Arc<RecordingRepository>,
        host: Arc<RecordingHost>,
        processor: ListProcessor,
    }

    fn harness(catalog: FakeCatalog, lists: Vec<ListDefinition>) -> Harness {
        let catalog = Arc::new(catalog);
        let store = Arc::new(FakeStore::default());
        let repository = Arc::new(RecordingRepository::with_lists(lists));
        let host = Arc::new(RecordingHost::default());
        let engine = EngineConfig {
            chunk_size: 2,
            lookup_delay_ms: 0,
            requeue_delay_secs: 30,
            workers: 1,
        };
        let processor = ListProcessor::new(
            catalog.clone(),
            store.clone(),
            repository.clone(),
            host.clone(),
            engine,
        );
        Harness {
            catalog,
            store,
            repository,
            host,
            processor,
        }
    }

    fn tracked_list(id: u64, tracked: &[u64]) -> ListDefinition {
        let mut list = ListDefinition::new(id, "Weekly", ListKind::Show, Owner::default());
        list.tracked = tracked.iter().map(|&id| CatalogId(id)).collect();
        list
    }

    async fn stored(h: &Harness, id: u64) -> Option<ListDefinition> {
        h.repository.get(ListId(id)).await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_pass_persists_membership() {
        let catalog = FakeCatalog::with_results(vec![item(2, "B", 2000), item(4, "D", 2001)]);
        let h = harness(catalog, vec![tracked_list(1, &[1, 2])]);

        let summary = h
            .processor
            .process(ListId(1), PassOptions::default())
            .await
            .unwrap();

        assert!(matches!(
            summary.outcome,
            PassOutcome::Completed(ApplySummary { added: 1, removed: 1, .. })
        ));
        let list = stored(&h, 1).await.unwrap();
        assert_eq!(list.tracked, [CatalogId(2), CatalogId(4)].into_iter().collect());
        assert_eq!(list.scan_state, ScanState::None);
        assert!(list.last_processed.is_some());
        assert_eq!(h.store.calls()[0], StoreCall::Fetch(ListId(1)));
        assert!(h.host.cycles().is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_pauses_list() {
        let catalog = FakeCatalog::default();
        catalog.fail_next_search(SourceError::Unauthorized("token expired".to_string()));
        let h = harness(catalog, vec![tracked_list(1, &[5])]);

        let summary = h
            .processor
            .process(ListId(1), PassOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.outcome, PassOutcome::Paused);
        let list = stored(&h, 1).await.unwrap();
        assert!(!list.process);
        assert_eq!(list.scan_state, ScanState::None);
        assert!(list.last_processed.is_some());
        assert!(h.store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_locked_account_pauses_list() {
        let h = harness(FakeCatalog::default(), vec![tracked_list(1, &[])]);
        h.store.fail_next_fetch(SourceError::Locked("account locked".to_string()));

        let summary = h.processor.process(ListId(1), PassOptions::default()).await.unwrap();
        assert_eq!(summary.outcome, PassOutcome::Paused);
        assert!(!stored(&h, 1).await.unwrap().process);
    }

    #[tokio::test]
    async fn test_missing_list_is_deleted_by_id() {
        let h = harness(FakeCatalog::default(), vec![]);

        let summary = h
            .processor
            .process(ListId(42), PassOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.outcome, PassOutcome::Deleted);
        assert!(h.store.calls().is_empty());

        let deletes = h.repository.deletes();
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].id, ListId(42));
        assert!(deletes[0].name.is_empty());
        assert_eq!(deletes[0].owner, Owner::default());
    }

    #[tokio::test]
    async fn test_upstream_not_found_deletes_record() {
        let h = harness(FakeCatalog::default(), vec![tracked_list(1, &[3])]);
        h.store.fail_next_fetch(SourceError::NotFound("list".to_string()));

        let summary = h
            .processor
            .process(ListId(1), PassOptions { force_refresh: true, queue_next: false })
            .await
            .unwrap();

        assert_eq!(summary.outcome, PassOutcome::Deleted);
        assert!(stored(&h, 1).await.is_none());
        assert!(!h
            .store
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::UpdateList(_))));
    }

    #[tokio::test]
    async fn test_invalid_argument_is_ignored() {
        let catalog = FakeCatalog::default();
        catalog.fail_next_search(SourceError::InvalidArgument("years".to_string()));
        let h = harness(catalog, vec![tracked_list(1, &[])]);

        let summary = h.processor.process(ListId(1), PassOptions::default()).await.unwrap();
        assert_eq!(summary.outcome, PassOutcome::Ignored);
        let list = stored(&h, 1).await.unwrap();
        assert!(list.process);
        assert_eq!(list.scan_state, ScanState::None);
    }

    #[tokio::test]
    async fn test_unclassified_failure_propagates_after_cleanup() {
        let h = harness(
            FakeCatalog::with_results(vec![item(1, "A", 2000), item(2, "B", 2000), item(3, "C", 2000)]),
            vec![tracked_list(1, &[])],
        );
        h.store.fail_next_add(SourceError::Http {
            status: 500,
            body: "boom".to_string(),
        });

        let err = h
            .processor
            .process(ListId(1), PassOptions { queue_next: true, force_refresh: false })
            .await
            .unwrap_err();

        assert!(matches!(err, PassError::Source(SourceError::Http { status: 500, .. })));
        let list = stored(&h, 1).await.unwrap();
        assert_eq!(list.scan_state, ScanState::None);
        assert!(list.last_processed.is_some());
        assert!(list.process);
        assert_eq!(h.host.cycles(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_manual_roster_report_is_persisted() {
        let catalog = FakeCatalog::with_titles(vec![
            ("Breaking Bad", 2008, item(10, "Breaking Bad", 2008)),
            ("The Wire", 2004, item(11, "The Wire", 2003)),
        ]);
        let mut list = tracked_list(1, &[]);
        list.roster = Some("Breaking Bad (2008)\nThe Wire (2004)".to_string());
        let h = harness(catalog, vec![list]);

        h.processor.process(ListId(1), PassOptions::default()).await.unwrap();

        let list = stored(&h, 1).await.unwrap();
        assert_eq!(
            list.roster_report.unwrap().lines(),
            vec![
                "Breaking Bad (2008) == Breaking Bad (2008)".to_string(),
                "The Wire (2004) != The Wire (2003)".to_string(),
            ]
        );
        assert_eq!(h.catalog.lookup_names().len(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_failure_is_not_raised() {
        let h = harness(FakeCatalog::default(), vec![tracked_list(1, &[])]);
        h.store.fail_next_update(SourceError::Http {
            status: 503,
            body: String::new(),
        });

        let summary = h
            .processor
            .process(ListId(1), PassOptions { queue_next: false, force_refresh: true })
            .await
            .unwrap();
        assert!(matches!(summary.outcome, PassOutcome::Completed(_)));

        h.processor
            .process(ListId(1), PassOptions { queue_next: false, force_refresh: true })
            .await
            .unwrap();
        assert!(h.store.calls().contains(&StoreCall::UpdateList(ListId(1))));
    }
}
