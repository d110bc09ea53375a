//! Source metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Total batches produced
    pub batches_produced: AtomicU64,

    /// Total records produced
    pub records_produced: AtomicU64,

    /// Empty batches produced
    pub empty_batches: AtomicU64,

    /// Parse error count (replay)
    pub parse_errors: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a produced batch
    pub fn record_batch(&self, records: usize) {
        self.batches_produced.fetch_add(1, Ordering::Relaxed);
        if records == 0 {
            self.empty_batches.fetch_add(1, Ordering::Relaxed);
        } else {
            self.records_produced
                .fetch_add(records as u64, Ordering::Relaxed);
        }
    }

    /// Record a parse error
    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            batches_produced: self.batches_produced.load(Ordering::Relaxed),
            records_produced: self.records_produced.load(Ordering::Relaxed),
            empty_batches: self.empty_batches.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSnapshot {
    /// Total batches produced
    pub batches_produced: u64,

    /// Total records produced
    pub records_produced: u64,

    /// Empty batches produced
    pub empty_batches: u64,

    /// Parse error count
    pub parse_errors: u64,
}
