//! Pipeline orchestrator - coordinates all components.
//!
//! Wires sources into the dispatcher and drives the run to completion:
//! bounded by max batches, timeout, or source exhaustion.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{Batch, DispatchPlan, SourceKind, StreamId};
use ingestion::{ReplayConfig, ReplaySource, SourcePipeline, SyntheticConfig, SyntheticSource};
use observability::record_batch_metrics;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The dispatch plan
    pub plan: DispatchPlan,

    /// Maximum number of batches to dispatch (None = unlimited)
    pub max_batches: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let plan = &self.config.plan;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Sources
        info!("Setting up batch sources...");
        let mut sources = SourcePipeline::new();
        register_source(&mut sources, plan)?;
        let active_sources = sources.source_count();

        info!(active_sources, "Source pipeline configured");

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(plan.queue.buffer_size);

        if plan.sinks.is_empty() {
            warn!("No sinks configured - records will be dropped");
        }

        let dispatcher = dispatcher::create_dispatcher(plan.sinks.clone(), batch_rx)
            .await
            .context("Failed to create dispatcher")?;

        let active_sinks = plan.sinks.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_sinks, "Dispatcher started");

        // Start Pipeline
        info!("Starting batch production...");
        sources.start_all();
        let source_rx = sources
            .take_receiver()
            .context("Failed to get source receiver")?;

        let max_batches = self.config.max_batches;

        info!(max_batches = ?max_batches, "Pipeline running");

        // Pipeline forwarding task
        let sources_ref = &sources;
        let pipeline_task = async move {
            let mut stats = PipelineStats {
                active_sources,
                active_sinks,
                ..Default::default()
            };

            loop {
                match tokio::time::timeout(Duration::from_millis(500), source_rx.recv()).await {
                    Ok(Ok(batch)) => {
                        stats.batches_received += 1;
                        stats.records_received += batch.len() as u64;
                        if batch.is_empty() {
                            stats.empty_batches += 1;
                        }

                        record_batch_metrics(&batch);
                        stats.dispatch_metrics.update(&batch);

                        debug!(
                            batch_id = batch.batch_id,
                            records = batch.len(),
                            "Batch received"
                        );

                        if batch_tx.send(batch).await.is_err() {
                            warn!("Dispatcher channel closed");
                            break;
                        }

                        // Check max batches limit
                        if let Some(max) = max_batches {
                            if stats.batches_received >= max {
                                info!(batches = stats.batches_received, "Reached max batches limit");
                                break;
                            }
                        }
                    }
                    Ok(Err(_)) => break,
                    Err(_) => {
                        // No batch in a while; a finished replay stops itself
                        if !sources_ref.any_running() {
                            info!("All sources finished");
                            break;
                        }
                    }
                }
            }

            stats
        };

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(stats) => stats,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    PipelineStats::default()
                }
            }
        } else {
            pipeline_task.await
        };

        // Shutdown
        info!("Shutting down pipeline...");
        sources.stop_all();

        // Wait for dispatcher to flush
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        let mut final_stats = stats;
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            rps = format!("{:.2}", final_stats.rps()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}

/// Build and register the configured batch source
fn register_source(sources: &mut SourcePipeline, plan: &DispatchPlan) -> Result<()> {
    match plan.source.kind {
        SourceKind::Synthetic => {
            let streams: Vec<StreamId> = plan
                .source
                .streams
                .iter()
                .map(|s| StreamId::new(s))
                .collect();

            let source = SyntheticSource::new(SyntheticConfig {
                source_id: "synthetic".to_string(),
                streams,
                rate_hz: plan.source.rate_hz,
                batch_size: plan.source.batch_size,
                ..Default::default()
            });
            sources.register_source(Box::new(source));
        }
        SourceKind::Replay => {
            let path = plan
                .source
                .path
                .clone()
                .context("replay source requires a path")?;

            let source = ReplaySource::new(ReplayConfig {
                source_id: "replay".to_string(),
                path,
                batch_size: plan.source.batch_size,
                speed: plan.source.speed,
            })
            .context("Failed to set up replay source")?;
            sources.register_source(Box::new(source));
        }
    }

    Ok(())
}
