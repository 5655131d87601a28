use super::{build_processor, load_config, open_repository};
use crate::host::{spawn_workers, LocalJobHost};
use crate::logging;
use crate::output::Output;
use color_eyre::Result;
use smartlist_config::PathManager;
use smartlist_core::{CycleDriver, JobHost, RequeueScheduler};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

pub struct DaemonOptions {
    pub schedule: Option<String>,
    pub no_startup_run: bool,
    /// Chain cycles back to back instead of waiting for the cron schedule
    pub chain: bool,
    pub verbose: u8,
    pub quiet: bool,
}

pub async fn run_daemon(options: DaemonOptions, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;

    logging::init_logging_with_file(
        options.verbose,
        options.quiet,
        &config.logging.level,
        config.logging.file.clone(),
    )
    .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let repository = open_repository(&paths);
    let (host, channels) = LocalJobHost::new();
    let host: Arc<dyn JobHost> = Arc::new(host);
    let processor = build_processor(&config, repository.clone(), host.clone());
    let (_workers, mut reports) =
        spawn_workers(channels.queues, processor, config.engine.workers);
    let driver = Arc::new(CycleDriver::new(
        repository,
        host,
        RequeueScheduler::new(config.engine.requeue_delay()),
    ));

    let scheduler_config = config.scheduler_or_default();
    let schedule = options.schedule.unwrap_or(scheduler_config.schedule);
    let run_on_startup = scheduler_config.run_on_startup && !options.no_startup_run;

    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create scheduler: {}", e))?;
    let cron_driver = driver.clone();
    let cron_job = Job::new_async(schedule.as_str(), move |_id, _scheduler| {
        let driver = cron_driver.clone();
        Box::pin(async move {
            info!(operation = "scheduled_cycle", "Starting scheduled processing cycle");
            run_cycle(&driver, false).await;
        })
    })
    .map_err(|e| color_eyre::eyre::eyre!("Invalid schedule '{}': {}", schedule, e))?;
    scheduler
        .add(cron_job)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to add scheduled job: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {}", e))?;

    info!(
        operation = "daemon_started",
        schedule = %schedule,
        workers = config.engine.workers,
        chain = options.chain,
        "Daemon started"
    );
    output.info(format!("Daemon running with schedule '{}'", schedule));

    if run_on_startup {
        info!(operation = "startup_cycle", "Running processing cycle on startup");
        run_cycle(&driver, options.chain).await;
    }

    let mut cycles = channels.cycles;
    loop {
        tokio::select! {
            Some(()) = cycles.recv() => run_cycle(&driver, options.chain).await,
            Some(report) = reports.recv() => match report.result {
                Ok(summary) => info!(
                    operation = "pass_complete",
                    list_id = %summary.list_id,
                    outcome = %summary.outcome,
                    "Processing pass finished"
                ),
                Err(e) => error!(
                    operation = "pass_failed",
                    list_id = %report.job.list_id,
                    error = %e,
                    "Processing pass failed"
                ),
            },
            else => break,
        }
    }

    Ok(())
}

async fn run_cycle(driver: &CycleDriver, chain: bool) {
    match driver.run_cycle(chain).await {
        Ok(summary) => info!(
            operation = "cycle_dispatched",
            triggered = summary.triggered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processing cycle dispatched"
        ),
        Err(e) => error!(operation = "cycle_failed", error = %e, "Processing cycle failed"),
    }
}
