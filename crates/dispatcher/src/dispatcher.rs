//! Dispatcher - main loop converting batches into per-record fan-out

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{Batch, Record, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sequential::{DispatchTarget, SequentialDispatcher};
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<Batch>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<Batch>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config).await?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    async fn initialize_handles(
        config: &DispatcherConfig,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config).await?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink))
        }
    }
}

/// Fan-out target: forwards each record to every sink handle.
///
/// Forwarding is a non-blocking channel send, so delivering a record and
/// removing it from the sequential queue never waits for sink completion.
pub struct FanOut {
    handles: Vec<SinkHandle>,
}

impl FanOut {
    /// Wrap sink handles into a fan-out target
    pub fn new(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    /// Recover the sink handles (for shutdown)
    pub fn into_handles(self) -> Vec<SinkHandle> {
        self.handles
    }
}

impl DispatchTarget<Record> for FanOut {
    fn deliver(&mut self, record: Record) {
        // Clone per extra sink; the last handle takes the original
        if let Some((last, rest)) = self.handles.split_last() {
            for handle in rest {
                handle.forward(record.clone());
            }
            last.forward(record);
        }
    }
}

/// The main Dispatcher that splits batches and fans records out to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<Batch>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<Batch>) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes batches from input and forwards one record at a time, in
    /// arrival order, to all sinks. Returns when input channel is closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut sequencer = SequentialDispatcher::new(FanOut::new(self.handles));
        let mut batch_count: u64 = 0;

        while let Some(batch) = self.input_rx.recv().await {
            batch_count += 1;
            sequencer.push(batch.records);

            if batch_count.is_multiple_of(100) {
                debug!(
                    batches = batch_count,
                    records = sequencer.delivered(),
                    "Dispatcher progress"
                );
            }
        }

        info!(
            batches = batch_count,
            records = sequencer.delivered(),
            "Dispatcher input closed, shutting down"
        );

        let fan_out = sequencer.into_target();
        Self::shutdown_handles(fan_out.into_handles()).await;

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<Batch>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config, input_rx).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Payload;
    use std::collections::HashMap;

    fn batch(batch_id: u64, seqs: std::ops::Range<u64>) -> Batch {
        let records = seqs
            .map(|seq| Record {
                stream: "test".into(),
                seq,
                timestamp: seq as f64 * 0.1,
                payload: Payload::Text(format!("r{seq}")),
                attrs: HashMap::new(),
            })
            .collect();
        Batch::new(batch_id, records)
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let (input_tx, input_rx) = mpsc::channel(10);

        // Create log sinks for testing
        let sink1 = LogSink::new("sink1");
        let sink2 = LogSink::new("sink2");

        let handles = vec![SinkHandle::spawn(sink1), SinkHandle::spawn(sink2)];

        let dispatcher = Dispatcher::with_handles(handles, input_rx);
        let handle = dispatcher.spawn();

        for i in 0..5 {
            input_tx.send(batch(i, i * 3..i * 3 + 3)).await.unwrap();
        }

        // Close input channel
        drop(input_tx);

        // Wait for dispatcher to finish
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_batches_deliver_nothing() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let sink = LogSink::new("empty_test");
        let handles = vec![SinkHandle::spawn(sink)];
        let dispatcher = Dispatcher::with_handles(handles, input_rx);

        let metrics = dispatcher.metrics();
        let handle = dispatcher.spawn();

        input_tx.send(Batch::empty(1)).await.unwrap();
        input_tx.send(Batch::empty(2)).await.unwrap();
        drop(input_tx);

        handle.await.unwrap();
        assert_eq!(metrics.len(), 1);
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            params: HashMap::new(),
        }];

        let dispatcher = create_dispatcher(configs, input_rx).await.unwrap();
        let handle = dispatcher.spawn();

        input_tx.send(batch(1, 0..4)).await.unwrap();

        drop(input_tx);
        handle.await.unwrap();
    }
}
