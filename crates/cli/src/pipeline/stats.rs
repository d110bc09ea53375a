//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::DispatchMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total batches received from sources
    pub batches_received: u64,

    /// Total records received from sources
    pub records_received: u64,

    /// Batches that carried no records
    pub empty_batches: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sources that were active
    pub active_sources: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Dispatch metrics aggregator
    pub dispatch_metrics: DispatchMetricsAggregator,
}

impl PipelineStats {
    /// Calculate records per second throughput
    pub fn rps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate empty batch rate as percentage
    #[allow(dead_code)]
    pub fn empty_rate(&self) -> f64 {
        if self.batches_received > 0 {
            (self.empty_batches as f64 / self.batches_received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Batches received: {}", self.batches_received);
        println!("   ├─ Records received: {}", self.records_received);
        println!("   ├─ Records/s: {:.2}", self.rps());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.dispatch_metrics.summary();

        println!("\n📈 Dispatch Metrics");
        println!(
            "   ├─ Empty batches: {} ({:.2}%)",
            summary.empty_batches, summary.empty_rate
        );
        println!("   └─ Batch size: {}", summary.batch_size);

        if !summary.stream_counts.is_empty() {
            println!("\n🔀 Records per Stream");
            for (stream, count) in &summary.stream_counts {
                println!("   ├─ {}: {}", stream, count);
            }
        }

        println!();
    }
}
