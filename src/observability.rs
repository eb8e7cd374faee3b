use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Counters for lifecycle engine activity
#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    pub transitions_applied: AtomicU64,
    pub transitions_refused: AtomicU64,
    pub log_entries_appended: AtomicU64,
    pub store_errors: AtomicU64,
    pub dispatch_requests: AtomicU64,
    pub dispatch_errors: AtomicU64,
}

impl LifecycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_transition(&self) {
        self.transitions_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refusal(&self) {
        self.transitions_refused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_log_entry(&self) {
        self.log_entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch(&self) {
        self.dispatch_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_error(&self) {
        self.dispatch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> LifecycleStats {
        LifecycleStats {
            transitions_applied: self.transitions_applied.load(Ordering::Relaxed),
            transitions_refused: self.transitions_refused.load(Ordering::Relaxed),
            log_entries_appended: self.log_entries_appended.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            dispatch_requests: self.dispatch_requests.load(Ordering::Relaxed),
            dispatch_errors: self.dispatch_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Lifecycle metrics: transitions={}, refused={}, log_entries={}, store_errors={}, dispatches={}, dispatch_errors={}",
            stats.transitions_applied,
            stats.transitions_refused,
            stats.log_entries_appended,
            stats.store_errors,
            stats.dispatch_requests,
            stats.dispatch_errors
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleStats {
    pub transitions_applied: u64,
    pub transitions_refused: u64,
    pub log_entries_appended: u64,
    pub store_errors: u64,
    pub dispatch_requests: u64,
    pub dispatch_errors: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
