//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SourceKind;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref replay) = args.replay {
        info!(path = %replay.display(), "Overriding source with replay file from CLI");
        plan.source.kind = SourceKind::Replay;
        plan.source.path = Some(replay.clone());
    }
    if let Some(speed) = args.speed {
        info!(speed = %speed, "Overriding replay speed from CLI");
        plan.source.speed = speed;
    }
    if let Some(buffer_size) = args.buffer_size {
        info!(buffer_size = %buffer_size, "Overriding queue buffer size from CLI");
        plan.queue.buffer_size = buffer_size;
    }

    info!(
        source_kind = ?plan.source.kind,
        streams = plan.source.streams.len(),
        batch_size = plan.source.batch_size,
        sinks = plan.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&plan);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        plan,
        max_batches: if args.max_batches == 0 {
            None
        } else {
            Some(args.max_batches)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        batches = stats.batches_received,
                        records = stats.records_received,
                        duration_secs = stats.duration.as_secs_f64(),
                        rps = format!("{:.2}", stats.rps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Seqcast finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(plan: &contracts::DispatchPlan) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!("  Kind: {:?}", plan.source.kind);
    println!("  Batch size: {}", plan.source.batch_size);
    match plan.source.kind {
        SourceKind::Synthetic => {
            println!("  Rate: {} Hz", plan.source.rate_hz);
            println!("  Streams: {:?}", plan.source.streams);
        }
        SourceKind::Replay => {
            if let Some(ref path) = plan.source.path {
                println!("  Path: {}", path.display());
            }
            println!("  Speed: {}x", plan.source.speed);
        }
    }

    println!("\nQueue:");
    println!("  Buffer size: {}", plan.queue.buffer_size);

    if !plan.sinks.is_empty() {
        println!("\nSinks ({}):", plan.sinks.len());
        for sink in &plan.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
