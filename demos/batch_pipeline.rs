//! Batch Pipeline Demo
//!
//! Demonstrates the full flow: SyntheticSource -> SourcePipeline ->
//! Dispatcher -> log + file sinks. Runs without any external input.
//!
//! Run with: cargo run --bin batch_pipeline

use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{Batch, DispatchPlan, StreamId};
use dispatcher::create_dispatcher;
use ingestion::{SourcePipeline, SyntheticConfig, SyntheticSource};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Batch Pipeline Demo");

    // ==== Stage 1: Use default config or load from file ====
    let plan = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading dispatch plan");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal test plan
        create_test_plan()?
    };

    // ==== Stage 2: Setup Sources ====
    tracing::info!("Setting up batch sources...");
    let mut sources = SourcePipeline::new();

    let streams: Vec<StreamId> = plan.source.streams.iter().map(|s| StreamId::new(s)).collect();
    sources.register_source(Box::new(SyntheticSource::new(SyntheticConfig {
        source_id: "demo".to_string(),
        streams,
        rate_hz: plan.source.rate_hz,
        batch_size: plan.source.batch_size,
        ..Default::default()
    })));

    tracing::info!(source_count = sources.source_count(), "Sources configured");

    // ==== Stage 3: Setup Dispatcher ====
    tracing::info!("Setting up dispatcher...");
    let (batch_tx, batch_rx) = mpsc::channel::<Batch>(plan.queue.buffer_size);
    let dispatcher = create_dispatcher(plan.sinks.clone(), batch_rx).await?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 4: Run ====
    tracing::info!("Starting pipeline...");
    sources.start_all();
    let source_rx = sources.take_receiver().unwrap();

    let target_batches = 20u64;
    let mut aggregator = observability::DispatchMetricsAggregator::new();
    let mut forwarded = 0u64;

    while let Ok(batch) = source_rx.recv().await {
        aggregator.update(&batch);
        forwarded += 1;

        tracing::info!(
            batch_id = batch.batch_id,
            records = batch.len(),
            "Forwarding batch"
        );

        if batch_tx.send(batch).await.is_err() {
            break;
        }
        if forwarded >= target_batches {
            break;
        }
    }

    // ==== Stage 5: Shutdown ====
    tracing::info!("Shutting down...");
    sources.stop_all();
    drop(batch_tx);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

    println!("{}", aggregator.summary());
    tracing::info!("Demo finished");

    Ok(())
}

/// Build a small synthetic plan with a log sink and a file sink
fn create_test_plan() -> Result<DispatchPlan, Box<dyn std::error::Error>> {
    use config_loader::ConfigFormat;

    let plan = ConfigLoader::load_from_str(
        r#"
[source]
kind = "synthetic"
streams = ["cam", "gps", "imu"]
rate_hz = 20.0
batch_size = 4

[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "archive"
sink_type = "file"
[sinks.params]
base_path = "./demo_output"
"#,
        ConfigFormat::Toml,
    )?;

    Ok(plan)
}
