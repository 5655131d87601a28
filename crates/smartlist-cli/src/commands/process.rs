use super::{build_processor, load_config, open_repository};
use crate::host::{spawn_workers, LocalJobHost};
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;
use smartlist_config::PathManager;
use smartlist_core::{
    trigger, JobHost, ListRepository, PassOptions, PassSummary, TriggerOutcome,
};
use smartlist_models::{ListId, ScanState};
use std::sync::Arc;

/// Trigger a list the way the driver would and wait for its pass to finish.
pub async fn run_scan(list_id: ListId, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let repository = open_repository(&paths);

    let (host, channels) = LocalJobHost::new();
    let host: Arc<dyn JobHost> = Arc::new(host);
    let processor = build_processor(&config, repository.clone(), host.clone());
    let (_workers, mut reports) = spawn_workers(channels.queues, processor, 1);

    match trigger(repository.as_ref(), host.as_ref(), list_id, PassOptions::default()).await? {
        TriggerOutcome::Scheduled(queue) => {
            output.info(format!("List {} scheduled on the {} queue", list_id, queue.as_str()));
        }
        TriggerOutcome::AlreadyActive(state) => {
            output.warn(format!(
                "List {} is already {}; use 'smartlist reset {}' if it is stuck",
                list_id, state, list_id
            ));
            return Ok(());
        }
        TriggerOutcome::Paused => {
            output.warn(format!(
                "List {} is paused; use 'smartlist resume {}' to re-enable it",
                list_id, list_id
            ));
            return Ok(());
        }
        TriggerOutcome::Missing => {
            return Err(color_eyre::eyre::eyre!("List {} not found", list_id));
        }
    }

    while let Some(report) = reports.recv().await {
        if report.job.list_id == list_id {
            let summary = report.result?;
            print_summary(&summary, output);
            return Ok(());
        }
    }
    Err(color_eyre::eyre::eyre!("Workers stopped before list {} was processed", list_id))
}

/// Run one pass in the foreground, bypassing the job queues.
///
/// The list must be idle; the pass claims it the same way a trigger does.
pub async fn run_process(
    list_id: ListId,
    queue_next: bool,
    force_refresh: bool,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let repository = open_repository(&paths);

    if let Claim::Busy(state) = claim(repository.as_ref(), list_id).await? {
        output.warn(format!(
            "List {} is already {}; use 'smartlist reset {}' if it is stuck",
            list_id, state, list_id
        ));
        return Ok(());
    }
    if queue_next {
        output.warn("Next cycle can only be scheduled by the daemon; --queue-next is ignored");
    }

    let processor = build_processor(&config, repository, Arc::new(LocalJobHost::foreground()));
    let options = PassOptions {
        queue_next,
        force_refresh,
    };

    let summary = processor.process(list_id, options).await?;
    print_summary(&summary, output);
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Claim {
    Claimed,
    /// No record; the pass still runs so the id gets cleaned up
    Missing,
    Busy(ScanState),
}

async fn claim(repository: &dyn ListRepository, list_id: ListId) -> Result<Claim> {
    if repository
        .compare_and_set_scan_state(list_id, ScanState::None, ScanState::Scheduled)
        .await?
    {
        return Ok(Claim::Claimed);
    }
    Ok(match repository.get(list_id).await? {
        Some(list) => Claim::Busy(list.scan_state),
        None => Claim::Missing,
    })
}

fn print_summary(summary: &PassSummary, output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "list_id": summary.list_id,
            "outcome": summary.outcome.to_string(),
        }));
        return;
    }
    output.success(format!("List {}: {}", summary.list_id, summary.outcome));
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlist_core::MemoryListRepository;
    use smartlist_models::{ListDefinition, ListKind, Owner};

    fn list(id: u64, state: ScanState) -> ListDefinition {
        let mut list = ListDefinition::new(id, "Nightly", ListKind::Movie, Owner::default());
        list.scan_state = state;
        list
    }

    #[tokio::test]
    async fn test_idle_list_is_claimed() {
        let repo = MemoryListRepository::with_lists([list(1, ScanState::None)]);
        assert_eq!(claim(&repo, ListId(1)).await.unwrap(), Claim::Claimed);
        let stored = repo.get(ListId(1)).await.unwrap().unwrap();
        assert_eq!(stored.scan_state, ScanState::Scheduled);
    }

    #[tokio::test]
    async fn test_active_list_is_left_alone() {
        let repo = MemoryListRepository::with_lists([list(1, ScanState::Updating)]);
        assert_eq!(
            claim(&repo, ListId(1)).await.unwrap(),
            Claim::Busy(ScanState::Updating)
        );
        let stored = repo.get(ListId(1)).await.unwrap().unwrap();
        assert_eq!(stored.scan_state, ScanState::Updating);
    }

    #[tokio::test]
    async fn test_unknown_list_is_reported_missing() {
        let repo = MemoryListRepository::default();
        assert_eq!(claim(&repo, ListId(7)).await.unwrap(), Claim::Missing);
    }
}
