use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use smartlist_core::{
    HostError, JobHost, JobQueue, ListProcessor, NullProgress, PassError, PassSummary,
    ProcessJob, ProgressSink,
};
use smartlist_models::ListId;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// In-process job host: two queues drained by a pool of tokio workers.
pub struct LocalJobHost {
    priority: mpsc::UnboundedSender<ProcessJob>,
    default: mpsc::UnboundedSender<ProcessJob>,
    cycles: mpsc::UnboundedSender<()>,
    progress: Option<MultiProgress>,
}

/// Receiving ends handed to the workers
pub struct JobQueues {
    priority: mpsc::UnboundedReceiver<ProcessJob>,
    default: mpsc::UnboundedReceiver<ProcessJob>,
}

pub struct HostChannels {
    pub queues: JobQueues,
    /// One message per requested processing cycle, sent once its delay has elapsed
    pub cycles: mpsc::UnboundedReceiver<()>,
}

/// Outcome of one job, as seen by whoever started the workers
pub struct JobReport {
    pub job: ProcessJob,
    pub result: Result<PassSummary, PassError>,
}

impl LocalJobHost {
    pub fn new() -> (Self, HostChannels) {
        let (priority_tx, priority_rx) = mpsc::unbounded_channel();
        let (default_tx, default_rx) = mpsc::unbounded_channel();
        let (cycles_tx, cycles_rx) = mpsc::unbounded_channel();

        let progress = is_interactive().then(MultiProgress::new);
        let host = Self {
            priority: priority_tx,
            default: default_tx,
            cycles: cycles_tx,
            progress,
        };
        let channels = HostChannels {
            queues: JobQueues {
                priority: priority_rx,
                default: default_rx,
            },
            cycles: cycles_rx,
        };
        (host, channels)
    }

    /// Host for a single pass run in the foreground: no workers pull its
    /// queues and no cycle runner is attached, so both are refused.
    pub fn foreground() -> Self {
        let (host, _) = Self::new();
        host
    }
}

#[async_trait]
impl JobHost for LocalJobHost {
    async fn enqueue(&self, job: ProcessJob) -> Result<(), HostError> {
        let queue = match job.queue {
            JobQueue::Priority => &self.priority,
            JobQueue::Default => &self.default,
        };
        queue
            .send(job)
            .map_err(|_| HostError::Unavailable(format!("{} queue is closed", job.queue.as_str())))
    }

    async fn schedule_cycle(&self, delay: Duration) -> Result<(), HostError> {
        if self.cycles.is_closed() {
            return Err(HostError::Unavailable("no cycle runner attached".to_string()));
        }
        let cycles = self.cycles.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = cycles.send(());
        });
        Ok(())
    }

    fn progress(&self, list_id: ListId, label: &str, total: usize) -> Box<dyn ProgressSink> {
        let Some(multi) = &self.progress else {
            return Box::new(NullProgress);
        };
        let bar = multi.add(ProgressBar::new(total as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  {spinner:.yellow} [{elapsed_precise}] [{wide_bar:.yellow/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        bar.set_message(format!("list {}: {} chunks", list_id, label));
        Box::new(BarProgress { bar })
    }
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressSink for BarProgress {
    fn advance(&mut self) {
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Start `workers` tasks pulling jobs, priority queue first.
///
/// Every finished job is reported on the returned channel.
pub fn spawn_workers(
    queues: JobQueues,
    processor: Arc<ListProcessor>,
    workers: usize,
) -> (Vec<JoinHandle<()>>, mpsc::UnboundedReceiver<JobReport>) {
    let queues = Arc::new(Mutex::new(queues));
    let (report_tx, report_rx) = mpsc::unbounded_channel();

    let handles = (0..workers.max(1))
        .map(|worker| {
            let queues = queues.clone();
            let processor = processor.clone();
            let report_tx = report_tx.clone();
            tokio::spawn(async move {
                while let Some(job) = next_job(&queues).await {
                    info!(worker, list_id = %job.list_id, queue = job.queue.as_str(), "Picked up job");
                    let result = processor.process(job.list_id, job.options).await;
                    if let Err(e) = &result {
                        error!(worker, list_id = %job.list_id, "Job failed: {}", e);
                    }
                    let _ = report_tx.send(JobReport { job, result });
                }
            })
        })
        .collect();

    (handles, report_rx)
}

async fn next_job(queues: &Mutex<JobQueues>) -> Option<ProcessJob> {
    let mut queues = queues.lock().await;
    let JobQueues { priority, default } = &mut *queues;
    tokio::select! {
        biased;
        Some(job) = priority.recv() => Some(job),
        Some(job) = default.recv() => Some(job),
        else => None,
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
