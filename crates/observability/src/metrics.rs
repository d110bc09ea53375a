//! 分发指标收集模块
//!
//! 基于 Batch 与投递结果收集管道运行指标。

use contracts::Batch;
use metrics::{counter, gauge, histogram};

/// 从 Batch 记录指标
///
/// 每次收到批次时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_metrics;
///
/// while let Ok(batch) = source_rx.recv().await {
///     record_batch_metrics(&batch);
///     // ...
/// }
/// ```
pub fn record_batch_metrics(batch: &Batch) {
    // 批次计数器
    counter!("seqcast_batches_total").increment(1);

    // 批次 ID (用于检测跳批)
    gauge!("seqcast_last_batch_id").set(batch.batch_id as f64);

    // 批次大小
    histogram!("seqcast_batch_size").record(batch.len() as f64);

    // 记录计数
    if batch.is_empty() {
        counter!("seqcast_empty_batches_total").increment(1);
    } else {
        counter!("seqcast_records_total").increment(batch.len() as u64);
    }

    // 各流记录计数
    for record in &batch.records {
        counter!(
            "seqcast_stream_records_total",
            "stream" => record.stream.to_string()
        )
        .increment(1);
    }
}

/// 记录单条投递结果
pub fn record_record_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "seqcast_records_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录 sink 队列深度
pub fn record_queue_depth(sink_name: &str, depth: usize) {
    gauge!(
        "seqcast_sink_queue_depth",
        "sink" => sink_name.to_string()
    )
    .set(depth as f64);
}

/// 记录排空延迟 (从批次到达到全部记录转发完成)
pub fn record_drain_latency_ms(latency_ms: f64) {
    histogram!("seqcast_drain_latency_ms").record(latency_ms);
}

/// 分发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// 总批次数
    pub total_batches: u64,

    /// 总记录数
    pub total_records: u64,

    /// 空批次数
    pub empty_batches: u64,

    /// 批次大小统计
    pub batch_size_stats: RunningStats,

    /// 各流记录计数
    pub stream_counts: std::collections::HashMap<String, u64>,
}

impl DispatchMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, batch: &Batch) {
        self.total_batches += 1;
        self.total_records += batch.len() as u64;

        if batch.is_empty() {
            self.empty_batches += 1;
        }

        self.batch_size_stats.push(batch.len() as f64);

        for record in &batch.records {
            *self
                .stream_counts
                .entry(record.stream.to_string())
                .or_insert(0) += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_batches: self.total_batches,
            total_records: self.total_records,
            empty_batches: self.empty_batches,
            empty_rate: if self.total_batches > 0 {
                self.empty_batches as f64 / self.total_batches as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_size_stats),
            stream_counts: self.stream_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_batches: u64,
    pub total_records: u64,
    pub empty_batches: u64,
    pub empty_rate: f64,
    pub batch_size: StatsSummary,
    pub stream_counts: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(f, "Total batches: {}", self.total_batches)?;
        writeln!(f, "Total records: {}", self.total_records)?;
        writeln!(
            f,
            "Empty batches: {} ({:.2}%)",
            self.empty_batches, self.empty_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;

        if !self.stream_counts.is_empty() {
            writeln!(f, "Records per stream:")?;
            for (stream, count) in &self.stream_counts {
                writeln!(f, "  {}: {}", stream, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
