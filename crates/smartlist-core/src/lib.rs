pub mod diff;
pub mod driver;
pub mod error;
pub mod host;
pub mod processor;
pub mod progress;
pub mod reconcile;
pub mod recovery;
pub mod repository;
pub mod requeue;
pub mod resolver;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use diff::{plan, ReconcilePlan};
pub use driver::{CycleDriver, CycleSummary};
pub use error::{HostError, PassError, RepositoryError, TriggerError};
pub use host::{JobHost, JobQueue, NullProgress, PassOptions, ProcessJob, ProgressSink};
pub use processor::{ListProcessor, PassOutcome, PassSummary};
pub use reconcile::{ApplySummary, ReconciliationEngine};
pub use recovery::RecoveryAction;
pub use repository::{ListRepository, MemoryListRepository};
pub use requeue::RequeueScheduler;
pub use resolver::{parse_roster_line, CandidateResolver, Resolution};
pub use state::{trigger, ProcessingLease, TriggerOutcome};
pub use storage::JsonListRepository;
