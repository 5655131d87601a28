use crate::error::HostError;
use async_trait::async_trait;
use smartlist_models::ListId;
use std::time::Duration;

/// Per-pass switches carried by a processing job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// Schedule another processing cycle once this pass ends
    pub queue_next: bool,
    /// Push the list's name and description upstream during cleanup
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JobQueue {
    #[default]
    Default,
    /// Lists owned by privileged accounts
    Priority,
}

impl JobQueue {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobQueue::Default => "default",
            JobQueue::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessJob {
    pub list_id: ListId,
    pub queue: JobQueue,
    pub options: PassOptions,
}

/// The background job host that runs processing passes.
#[async_trait]
pub trait JobHost: Send + Sync {
    /// Queue one processing pass. Must not wait for the pass to run.
    async fn enqueue(&self, job: ProcessJob) -> Result<(), HostError>;

    /// Arrange for a processing cycle to start after `delay`.
    async fn schedule_cycle(&self, delay: Duration) -> Result<(), HostError>;

    /// Progress display for one unit of work with `total` steps
    fn progress(&self, list_id: ListId, label: &str, total: usize) -> Box<dyn ProgressSink>;
}

pub trait ProgressSink: Send {
    fn advance(&mut self);
    fn finish(&mut self);
}

/// Sink that discards progress updates
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn advance(&mut self) {}
    fn finish(&mut self) {}
}
