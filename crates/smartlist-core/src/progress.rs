use std::time::Instant;
use tracing::{info, warn};

/// Running counts for one reconciliation apply, logged as a single summary line.
pub struct ApplyTracker {
    planned_add: usize,
    planned_remove: usize,
    added: usize,
    removed: usize,
    chunks: usize,
    failed_chunks: usize,
    start_time: Instant,
}

impl ApplyTracker {
    pub fn new(planned_add: usize, planned_remove: usize) -> Self {
        if planned_add + planned_remove > 0 {
            info!(
                "Reconciling: {} to add, {} to remove",
                planned_add, planned_remove
            );
        }
        Self {
            planned_add,
            planned_remove,
            added: 0,
            removed: 0,
            chunks: 0,
            failed_chunks: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_added(&mut self, count: usize) {
        self.added += count;
        self.chunks += 1;
    }

    pub fn record_removed(&mut self, count: usize) {
        self.removed += count;
        self.chunks += 1;
    }

    pub fn record_failed_chunk(&mut self) {
        self.failed_chunks += 1;
    }

    pub fn added(&self) -> usize {
        self.added
    }

    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn log_summary(&self, list_name: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if self.failed_chunks > 0 {
            warn!(
                "{} reconcile stopped after {:.1}s | Added: {}/{} | Removed: {}/{} | Chunks: {} | Failed: {}",
                list_name, elapsed,
                self.added, self.planned_add,
                self.removed, self.planned_remove,
                self.chunks, self.failed_chunks
            );
        } else if self.planned_add + self.planned_remove > 0 {
            info!(
                "{} reconciled in {:.1}s | Added: {} | Removed: {} | Chunks: {}",
                list_name, elapsed, self.added, self.removed, self.chunks
            );
        }
    }
}
