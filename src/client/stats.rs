//! Dispatcher counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of dispatcher activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    /// Batches posted to the batch endpoint
    pub batches_sent: u64,
    /// Logical requests carried inside those batches
    pub requests_batched: u64,
    /// Requests sent on the direct path
    pub direct_requests: u64,
    /// Batches or direct calls that failed at the transport level
    pub transport_failures: u64,
    /// Extra HTTP attempts made by the retry policy
    pub retries: u64,
}

impl DispatcherStats {
    /// Average logical requests per batch
    pub fn average_batch_size(&self) -> f64 {
        if self.batches_sent == 0 {
            0.0
        } else {
            self.requests_batched as f64 / self.batches_sent as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    batches_sent: AtomicU64,
    requests_batched: AtomicU64,
    direct_requests: AtomicU64,
    transport_failures: AtomicU64,
    retries: AtomicU64,
}

impl StatsCollector {
    pub(crate) fn record_batch(&self, size: usize) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.requests_batched.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_direct(&self) {
        self.direct_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retries(&self, attempts: u32) {
        if attempts > 1 {
            self.retries.fetch_add(u64::from(attempts - 1), Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            requests_batched: self.requests_batched.load(Ordering::Relaxed),
            direct_requests: self.direct_requests.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}
