//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（源 → 管道 → 分发器 → sink）
//! - 顺序与恰好一次投递的回归基线

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod plan_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    /// 配置 → 计划 → 聚合器的快照测试
    #[test]
    fn test_plan_loads_and_aggregator_tracks() {
        let plan = ConfigLoader::load_from_str(
            r#"
[source]
kind = "synthetic"
streams = ["cam", "gps"]
batch_size = 3

[[sinks]]
name = "log"
sink_type = "log"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(plan.source.streams, vec!["cam", "gps"]);

        let mut aggregator = observability::DispatchMetricsAggregator::new();
        aggregator.update(&contracts::Batch::empty(1));
        assert_eq!(aggregator.total_batches, 1);
        assert_eq!(aggregator.empty_batches, 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use contracts::{Batch, DispatchError, Payload, Record, RecordSink, SinkConfig, SinkType};
    use dispatcher::{create_dispatcher, Dispatcher, SinkHandle};
    use ingestion::{ReplayConfig, ReplaySource, SourcePipeline, SyntheticSource};
    use tokio::sync::mpsc;

    /// Sink that records every delivered (stream, seq) pair
    struct RecordingSink {
        name: String,
        seen: Arc<Mutex<Vec<(String, u64)>>>,
    }

    impl RecordingSink {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<(String, u64)>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    seen: Arc::clone(&seen),
                },
                seen,
            )
        }
    }

    impl RecordSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(&mut self, record: &Record) -> Result<(), DispatchError> {
            self.seen
                .lock()
                .unwrap()
                .push((record.stream.to_string(), record.seq));
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), DispatchError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    fn text_record(stream: &str, seq: u64) -> Record {
        Record {
            stream: stream.into(),
            seq,
            timestamp: seq as f64 * 0.01,
            payload: Payload::Text(format!("r{seq}")),
            attrs: HashMap::new(),
        }
    }

    fn batch_of(batch_id: u64, seqs: &[u64]) -> Batch {
        Batch::new(
            batch_id,
            seqs.iter().map(|&seq| text_record("alpha", seq)).collect(),
        )
    }

    /// End-to-end test: SyntheticSource -> SourcePipeline -> Dispatcher
    ///
    /// 验证完整的数据流：
    /// 1. SyntheticSource 生成批次
    /// 2. SourcePipeline 合并批次流
    /// 3. Dispatcher 将记录逐条分发到 sinks
    #[tokio::test]
    async fn test_e2e_synthetic_pipeline() {
        // Setup: synthetic source at a fast rate
        let source = SyntheticSource::with_streams("gen", vec!["cam".into(), "gps".into()], 200.0);

        let mut pipeline = SourcePipeline::new();
        pipeline.register_source(Box::new(source));

        // Create dispatcher with log sink
        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(100);
        let sink_configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            params: HashMap::new(),
        }];

        let dispatcher = create_dispatcher(sink_configs, batch_rx).await.unwrap();
        let dispatcher_handle = dispatcher.spawn();

        pipeline.start_all();
        let source_rx = pipeline.take_receiver().unwrap();

        let target_batches = 5u64;

        // Forward batches from source to dispatcher
        let forward_handle = tokio::spawn(async move {
            let mut forwarded = 0u64;
            while let Ok(batch) = source_rx.recv().await {
                forwarded += 1;
                if batch_tx.send(batch).await.is_err() {
                    break;
                }
                if forwarded >= target_batches {
                    break;
                }
            }
            forwarded
        });

        let result = tokio::time::timeout(Duration::from_secs(5), forward_handle).await;

        pipeline.stop_all();

        // Wait for dispatcher to drain
        let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

        assert!(result.is_ok(), "Pipeline timed out");
        let forwarded = result.unwrap().unwrap();
        assert!(
            forwarded >= target_batches,
            "Should forward at least {} batches, got {}",
            target_batches,
            forwarded
        );
        assert!(pipeline.metrics().snapshot().records_produced > 0);
    }

    /// 验证恰好一次、按到达顺序的投递
    #[tokio::test]
    async fn test_exactly_once_in_order_delivery() {
        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(10);

        let (sink, seen) = RecordingSink::new("recorder");
        let handles = vec![SinkHandle::spawn(sink)];
        let dispatcher = Dispatcher::with_handles(handles, batch_rx);
        let dispatcher_handle = dispatcher.spawn();

        // Push batches, including an empty one mid-stream
        batch_tx.send(batch_of(1, &[1, 2, 3])).await.unwrap();
        batch_tx.send(batch_of(2, &[4, 5])).await.unwrap();
        batch_tx.send(Batch::empty(3)).await.unwrap();
        batch_tx.send(batch_of(4, &[6])).await.unwrap();

        drop(batch_tx);
        dispatcher_handle.await.unwrap();

        let seen = seen.lock().unwrap();
        let seqs: Vec<u64> = seen.iter().map(|(_, seq)| *seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
    }

    /// Test dispatcher with multiple sinks: every sink sees every record
    #[tokio::test]
    async fn test_dispatcher_multiple_sinks() {
        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(10);

        let (sink1, seen1) = RecordingSink::new("rec1");
        let (sink2, seen2) = RecordingSink::new("rec2");
        let handles = vec![SinkHandle::spawn(sink1), SinkHandle::spawn(sink2)];

        let dispatcher = Dispatcher::with_handles(handles, batch_rx);

        // Check metrics before running
        let metrics = dispatcher.metrics();
        assert_eq!(metrics.len(), 2);

        let dispatcher_handle = dispatcher.spawn();

        for i in 0..5u64 {
            batch_tx
                .send(batch_of(i + 1, &[i * 2 + 1, i * 2 + 2]))
                .await
                .unwrap();
        }

        drop(batch_tx);
        let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

        let expected: Vec<u64> = (1..=10).collect();
        let seqs1: Vec<u64> = seen1.lock().unwrap().iter().map(|(_, s)| *s).collect();
        let seqs2: Vec<u64> = seen2.lock().unwrap().iter().map(|(_, s)| *s).collect();
        assert_eq!(seqs1, expected);
        assert_eq!(seqs2, expected);
    }

    /// End-to-end test: recorded file -> ReplaySource -> Dispatcher
    #[tokio::test]
    async fn test_e2e_replay_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        for seq in 1..=9u64 {
            let line = serde_json::to_string(&text_record("replayed", seq)).unwrap();
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();

        let source = ReplaySource::new(ReplayConfig {
            source_id: "replay".to_string(),
            path: file.path().to_path_buf(),
            batch_size: 4,
            speed: 0.0,
        })
        .unwrap();

        let mut pipeline = SourcePipeline::new();
        pipeline.register_source(Box::new(source));

        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(10);
        let (sink, seen) = RecordingSink::new("recorder");
        let dispatcher = Dispatcher::with_handles(vec![SinkHandle::spawn(sink)], batch_rx);
        let dispatcher_handle = dispatcher.spawn();

        pipeline.start_all();
        let source_rx = pipeline.take_receiver().unwrap();

        // Replay stops itself at end of file; drain until then
        let forward_handle = tokio::spawn(async move {
            loop {
                match tokio::time::timeout(Duration::from_millis(200), source_rx.recv()).await {
                    Ok(Ok(batch)) => {
                        if batch_tx.send(batch).await.is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        });

        let _ = tokio::time::timeout(Duration::from_secs(5), forward_handle).await;
        let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

        let seen = seen.lock().unwrap();
        let seqs: Vec<u64> = seen.iter().map(|(_, seq)| *seq).collect();
        assert_eq!(seqs, (1..=9).collect::<Vec<u64>>());
        assert!(seen.iter().all(|(stream, _)| stream == "replayed"));
    }
}
