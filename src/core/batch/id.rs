//! Correlation id generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates `req_<unix-millis>_<counter>` ids.
///
/// The counter never repeats for one generator, so two requests created in
/// the same millisecond (or sitting in overlapping in-flight batches) still
/// get distinct ids.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    counter: AtomicU64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "req_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sequence
        )
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
