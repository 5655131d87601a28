use crate::host::JobHost;
use std::time::Duration;
use tracing::{info, warn};

/// Hands the next processing cycle to the job host after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct RequeueScheduler {
    delay: Duration,
}

impl RequeueScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Fire and forget: a refusal from the host is logged, not returned.
    pub async fn schedule_next(&self, host: &dyn JobHost) {
        match host.schedule_cycle(self.delay).await {
            Ok(()) => info!(delay_secs = self.delay.as_secs(), "Next processing cycle scheduled"),
            Err(e) => warn!("Failed to schedule next processing cycle: {}", e),
        }
    }
}
