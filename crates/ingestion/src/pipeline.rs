//! Source pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{unbounded, Receiver, Sender};
use contracts::{Batch, BatchCallback, BatchSource};
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::config::IngestMetrics;

/// Source pipeline
///
/// Manages multiple batch sources, provides one merged batch stream.
/// The merge channel is unbounded: a produced batch is never dropped, and
/// arrival order on the channel defines the dispatch order downstream.
pub struct SourcePipeline {
    /// Registered sources
    sources: HashMap<String, Box<dyn BatchSource>>,

    /// Shared metrics
    metrics: Arc<IngestMetrics>,

    /// Batch sender (shared by all sources)
    tx: Sender<Batch>,

    /// Batch receiver
    rx: Option<Receiver<Batch>>,
}

impl SourcePipeline {
    /// Create new source pipeline
    pub fn new() -> Self {
        let (tx, rx) = unbounded();

        Self {
            sources: HashMap::new(),
            metrics: Arc::new(IngestMetrics::new()),
            tx,
            rx: Some(rx),
        }
    }

    /// Register a batch source
    #[instrument(
        name = "pipeline_register_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_source(&mut self, source: Box<dyn BatchSource>) {
        let source_id = source.source_id().to_string();
        debug!(source_id = %source_id, "registered batch source");
        self.sources.insert(source_id, source);
    }

    /// Start all registered sources
    #[instrument(name = "pipeline_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.sources.len(), "starting all batch sources");
        for (source_id, source) in &self.sources {
            self.start_source(source_id, source.as_ref());
        }
    }

    /// Stop all sources
    #[instrument(name = "pipeline_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.sources.len(), "stopping all batch sources");
        for (source_id, source) in &self.sources {
            if source.is_running() {
                debug!(source_id = %source_id, "stopping source");
                source.stop();
            }
        }
    }

    fn start_source(&self, source_id: &str, source: &dyn BatchSource) {
        if source.is_running() {
            return;
        }

        debug!(source_id = %source_id, "starting source");
        source.listen(self.merge_callback(source_id));
    }

    /// Build the callback that funnels one source into the merge channel
    fn merge_callback(&self, source_id: &str) -> BatchCallback {
        let tx = self.tx.clone();
        let metrics = self.metrics.clone();
        let source_id = source_id.to_string();

        Arc::new(move |batch: Batch| {
            metrics.record_batch(batch.len());
            counter!(
                "seqcast_batches_produced_total",
                "source_id" => source_id.clone()
            )
            .increment(1);

            if tx.try_send(batch).is_err() {
                // Receiver gone; the run is over
                debug!(source_id = %source_id, "merge channel closed");
            }
        })
    }

    /// Get batch stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<Batch>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Check if specified source is running
    pub fn is_source_running(&self, source_id: &str) -> bool {
        self.sources
            .get(source_id)
            .map(|s| s.is_running())
            .unwrap_or(false)
    }

    /// Check if any registered source is still running
    ///
    /// A finished replay stops itself; orchestrators use this to detect
    /// source exhaustion.
    pub fn any_running(&self) -> bool {
        self.sources.values().any(|s| s.is_running())
    }
}

impl Default for SourcePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SourcePipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
