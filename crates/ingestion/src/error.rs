//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 回放文件无法打开
    #[error("failed to open replay file '{path}': {message}")]
    ReplayOpen {
        /// 文件路径
        path: String,
        /// 错误消息
        message: String,
    },

    /// 记录解析失败
    #[error("failed to parse record at line {line}: {message}")]
    ParseFailed {
        /// 行号
        line: u64,
        /// 错误消息
        message: String,
    },

    /// 通道已关闭
    #[error("channel closed for source {source_id}")]
    ChannelClosed {
        /// 源 ID
        source_id: String,
    },

    /// 源已在运行
    #[error("source {source_id} is already running")]
    AlreadyRunning {
        /// 源 ID
        source_id: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
