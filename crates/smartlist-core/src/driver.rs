use crate::error::RepositoryError;
use crate::host::{JobHost, PassOptions};
use crate::repository::ListRepository;
use crate::requeue::RequeueScheduler;
use crate::state::{trigger, TriggerOutcome};
use smartlist_models::ListId;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub triggered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Triggers every eligible list once per cycle.
pub struct CycleDriver {
    repository: Arc<dyn ListRepository>,
    host: Arc<dyn JobHost>,
    requeue: RequeueScheduler,
}

impl CycleDriver {
    pub fn new(
        repository: Arc<dyn ListRepository>,
        host: Arc<dyn JobHost>,
        requeue: RequeueScheduler,
    ) -> Self {
        Self {
            repository,
            host,
            requeue,
        }
    }

    /// With `chain`, the last job triggered carries `queue_next` so the
    /// following cycle is scheduled once it ends.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, chain: bool) -> Result<CycleSummary, RepositoryError> {
        let lists = self.repository.list_all().await?;
        let eligible: Vec<ListId> = lists
            .iter()
            .filter(|list| list.process && list.scan_state.is_idle())
            .map(|list| list.id)
            .collect();

        let mut summary = CycleSummary {
            skipped: lists.len() - eligible.len(),
            ..CycleSummary::default()
        };
        let mut chained = false;

        for (index, list_id) in eligible.iter().enumerate() {
            let options = PassOptions {
                queue_next: chain && index + 1 == eligible.len(),
                force_refresh: false,
            };
            match trigger(self.repository.as_ref(), self.host.as_ref(), *list_id, options).await {
                Ok(TriggerOutcome::Scheduled(_)) => {
                    summary.triggered += 1;
                    chained |= options.queue_next;
                }
                Ok(outcome) => {
                    debug!(list_id = %list_id, ?outcome, "List not triggered");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(list_id = %list_id, "Failed to trigger list: {}", e);
                    summary.failed += 1;
                }
            }
        }

        if chain && !chained {
            self.requeue.schedule_next(self.host.as_ref()).await;
        }

        info!(
            triggered = summary.triggered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processing cycle dispatched"
        );
        Ok(summary)
    }
}
