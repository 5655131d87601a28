use crate::error::{PassError, RepositoryError, TriggerError};
use crate::host::{JobHost, JobQueue, PassOptions, ProcessJob};
use crate::repository::ListRepository;
use chrono::Utc;
use smartlist_models::{ListDefinition, ListId, ScanState};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The list moved to `Scheduled` and a job was queued
    Scheduled(JobQueue),
    /// Another pass owns the list; nothing was queued
    AlreadyActive(ScanState),
    /// `process = false`
    Paused,
    Missing,
}

/// Claim an idle list and queue one processing pass for it.
///
/// The `None -> Scheduled` move is persisted before the job is handed to
/// the host, so a concurrent trigger sees the list as active and backs off.
/// If the host refuses the job the claim is rolled back.
pub async fn trigger(
    repository: &dyn ListRepository,
    host: &dyn JobHost,
    list_id: ListId,
    options: PassOptions,
) -> Result<TriggerOutcome, TriggerError> {
    let Some(list) = repository.get(list_id).await? else {
        return Ok(TriggerOutcome::Missing);
    };
    if !list.process {
        debug!(list_id = %list_id, "List is paused, not triggering");
        return Ok(TriggerOutcome::Paused);
    }

    let claimed = repository
        .compare_and_set_scan_state(list_id, ScanState::None, ScanState::Scheduled)
        .await?;
    if !claimed {
        return Ok(match repository.get(list_id).await? {
            Some(current) => TriggerOutcome::AlreadyActive(current.scan_state),
            None => TriggerOutcome::Missing,
        });
    }

    let queue = if list.owner.is_privileged {
        JobQueue::Priority
    } else {
        JobQueue::Default
    };
    let job = ProcessJob {
        list_id,
        queue,
        options,
    };
    if let Err(e) = host.enqueue(job).await {
        warn!(list_id = %list_id, "Job host rejected pass, releasing claim: {}", e);
        repository
            .compare_and_set_scan_state(list_id, ScanState::Scheduled, ScanState::None)
            .await?;
        return Err(e.into());
    }

    info!(list_id = %list_id, queue = queue.as_str(), "List scheduled");
    Ok(TriggerOutcome::Scheduled(queue))
}

/// Ownership of one list for the duration of a processing pass.
///
/// Acquiring persists `Updating`. `release` persists `None` together with
/// the processing timestamp and any changes made through `list_mut`.
#[must_use = "an unreleased lease leaves the list stuck in Updating"]
pub struct ProcessingLease<'a> {
    repository: &'a dyn ListRepository,
    list: ListDefinition,
    settled: bool,
}

impl<'a> ProcessingLease<'a> {
    pub async fn acquire(
        repository: &'a dyn ListRepository,
        list_id: ListId,
    ) -> Result<ProcessingLease<'a>, PassError> {
        let mut list = repository
            .get(list_id)
            .await?
            .ok_or(PassError::ListMissing(list_id))?;
        list.scan_state = ScanState::Updating;
        repository.update(&list).await?;
        debug!(list_id = %list_id, "Processing lease acquired");

        Ok(ProcessingLease {
            repository,
            list,
            settled: false,
        })
    }

    pub fn list(&self) -> &ListDefinition {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListDefinition {
        &mut self.list
    }

    /// Return the list to `None` and stamp `last_processed`.
    ///
    /// Writes nothing if the record was deleted while the pass ran.
    pub async fn release(mut self) -> Result<(), RepositoryError> {
        self.settled = true;
        if self.repository.get(self.list.id).await?.is_none() {
            debug!(list_id = %self.list.id, "List deleted during pass, nothing to release");
            return Ok(());
        }
        self.list.scan_state = ScanState::None;
        self.list.last_processed = Some(Utc::now());
        self.repository.update(&self.list).await?;
        debug!(list_id = %self.list.id, "Processing lease released");
        Ok(())
    }

    /// Give up the lease without persisting anything, for lists about to be deleted.
    pub fn forfeit(mut self) -> ListDefinition {
        self.settled = true;
        let placeholder = ListDefinition::stub(self.list.id);
        std::mem::replace(&mut self.list, placeholder)
    }
}

impl Drop for ProcessingLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                list_id = %self.list.id,
                "Processing lease dropped without release; list stays Updating until reset"
            );
        }
    }
}
