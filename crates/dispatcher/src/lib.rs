//! # Dispatcher
//!
//! 顺序分发模块。
//!
//! 负责：
//! - 消费 `Batch`，按到达顺序拆分为单条 `Record`
//! - 每条记录恰好投递一次（FIFO，不跳过、不重复）
//! - Fan-out 到多个 sinks，隔离慢 sink，不阻塞主链路

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sequential;
pub mod sinks;

pub use contracts::{Batch, Record, RecordSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig, FanOut};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sequential::{DispatchState, DispatchTarget, SequentialDispatcher};
pub use sinks::{FileSink, LogSink, NetworkSink};
