//! Replay batch source
//!
//! Re-emits records from a recorded JSON-lines file, grouped into batches
//! and paced by the recorded timestamps.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{Batch, BatchCallback, BatchSource, Record, StreamId};
use tracing::{debug, warn};

use crate::config::IngestMetrics;
use crate::error::IngestionError;

/// Replay source configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Source ID
    pub source_id: String,

    /// Recorded JSON-lines file (one `Record` per line)
    pub path: PathBuf,

    /// Records per emitted batch
    pub batch_size: usize,

    /// Speed multiplier (1.0 = recorded pace, 0 or less = as fast as possible)
    pub speed: f64,
}

/// Batch source that replays a recorded file.
///
/// Lines that fail to parse are skipped and counted; replay continues with
/// the next line. The source stops itself at end of file.
pub struct ReplaySource {
    config: ReplayConfig,
    running: Arc<AtomicBool>,
    metrics: Arc<IngestMetrics>,
}

impl ReplaySource {
    /// Create a new replay source.
    ///
    /// # Errors
    /// Fails if the recorded file cannot be opened.
    pub fn new(config: ReplayConfig) -> Result<Self, IngestionError> {
        // Preflight: surface a missing file at build time, not mid-run
        File::open(&config.path).map_err(|e| IngestionError::ReplayOpen {
            path: config.path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(IngestMetrics::new()),
        })
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        self.metrics.clone()
    }

    fn replay_loop(
        config: &ReplayConfig,
        running: &AtomicBool,
        metrics: &IngestMetrics,
        callback: BatchCallback,
    ) -> std::io::Result<()> {
        let reader = BufReader::new(File::open(&config.path)?);

        let mut batch_id: u64 = 0;
        let mut pending: Vec<Record> = Vec::with_capacity(config.batch_size);
        let mut last_timestamp: Option<f64> = None;

        for (idx, line) in reader.lines().enumerate() {
            if !running.load(Ordering::Relaxed) {
                break;
            }

            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: Record = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    metrics.record_parse_error();
                    warn!(
                        source_id = %config.source_id,
                        line = idx as u64 + 1,
                        error = %e,
                        "skipping unparseable record"
                    );
                    continue;
                }
            };

            if config.speed > 0.0 {
                if let Some(prev) = last_timestamp {
                    let gap = (record.timestamp - prev).max(0.0) / config.speed;
                    std::thread::sleep(Duration::from_secs_f64(gap));
                }
            }
            last_timestamp = Some(record.timestamp);

            pending.push(record);
            if pending.len() >= config.batch_size {
                batch_id += 1;
                metrics.record_batch(pending.len());
                callback(Batch::new(batch_id, std::mem::take(&mut pending)));
            }
        }

        // Tail batch
        if !pending.is_empty() {
            batch_id += 1;
            metrics.record_batch(pending.len());
            callback(Batch::new(batch_id, pending));
        }

        debug!(
            source_id = %config.source_id,
            batches = batch_id,
            "replay finished"
        );
        Ok(())
    }
}

impl BatchSource for ReplaySource {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn stream_ids(&self) -> Vec<StreamId> {
        // Streams are whatever the recording contains
        Vec::new()
    }

    fn listen(&self, callback: BatchCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();
        let metrics = self.metrics.clone();

        std::thread::spawn(move || {
            debug!(
                source_id = %config.source_id,
                path = %config.path.display(),
                speed = config.speed,
                "replay source started"
            );

            if let Err(e) = Self::replay_loop(&config, &running, &metrics, callback) {
                warn!(source_id = %config.source_id, error = %e, "replay aborted");
            }

            running.store(false, Ordering::SeqCst);
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
