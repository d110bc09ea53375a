//! Mock 批次源
//!
//! 用于无外部输入环境的测试与演示。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{Batch, BatchCallback, BatchSource, Payload, Record, StreamId};
use tracing::{debug, trace};

/// 合成批次源配置
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// 源 ID
    pub source_id: String,

    /// 发射的流
    pub streams: Vec<StreamId>,

    /// 批次产生频率 (Hz)
    pub rate_hz: f64,

    /// 每批记录数
    pub batch_size: usize,

    /// Raw payload 大小（字节）
    pub payload_bytes: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            source_id: "synthetic".to_string(),
            streams: vec!["default".into()],
            rate_hz: 10.0,
            batch_size: 8,
            payload_bytes: 32,
        }
    }
}

/// 合成批次源
///
/// 以固定频率轮流在各流上生成批次。
pub struct SyntheticSource {
    config: SyntheticConfig,
    running: Arc<AtomicBool>,
}

impl SyntheticSource {
    /// 创建新的合成源
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 以给定流与频率创建
    pub fn with_streams(source_id: &str, streams: Vec<StreamId>, rate_hz: f64) -> Self {
        Self::new(SyntheticConfig {
            source_id: source_id.to_string(),
            streams,
            rate_hz,
            ..Default::default()
        })
    }
}

impl BatchSource for SyntheticSource {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn stream_ids(&self) -> Vec<StreamId> {
        self.config.streams.clone()
    }

    fn listen(&self, callback: BatchCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();

        std::thread::spawn(move || {
            let interval = Duration::from_secs_f64(1.0 / config.rate_hz);
            let start_time = Instant::now();
            let mut batch_id: u64 = 0;
            let mut seqs: HashMap<StreamId, u64> = HashMap::new();

            debug!(
                source_id = %config.source_id,
                streams = config.streams.len(),
                rate_hz = config.rate_hz,
                "synthetic source started"
            );

            while running.load(Ordering::Relaxed) {
                let stream = &config.streams[(batch_id as usize) % config.streams.len()];
                batch_id += 1;

                let records = (0..config.batch_size)
                    .map(|_| {
                        let seq = seqs.entry(stream.clone()).or_insert(0);
                        *seq += 1;
                        make_record(stream, *seq, start_time, config.payload_bytes)
                    })
                    .collect();

                callback(Batch::new(batch_id, records));

                trace!(
                    source_id = %config.source_id,
                    batch_id,
                    stream = %stream,
                    "synthetic batch emitted"
                );

                std::thread::sleep(interval);
            }

            debug!(source_id = %config.source_id, "synthetic source stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

fn make_record(stream: &StreamId, seq: u64, start_time: Instant, payload_bytes: usize) -> Record {
    let timestamp = start_time.elapsed().as_secs_f64();

    // Cycle payload kinds so every sink path gets exercised
    let payload = match seq % 3 {
        0 => Payload::Raw(Bytes::from(vec![0xAB; payload_bytes])),
        1 => Payload::Text(format!("{stream}-{seq}")),
        _ => Payload::Json(serde_json::json!({
            "stream": stream.as_str(),
            "seq": seq,
        })),
    };

    Record {
        stream: stream.clone(),
        seq,
        timestamp,
        payload,
        attrs: HashMap::new(),
    }
}
