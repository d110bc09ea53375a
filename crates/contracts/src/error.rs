//! Layered error definitions
//!
//! Categorized by source: config / source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum DispatchError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Replay file cannot be opened
    #[error("replay open error for '{path}': {message}")]
    ReplayOpen { path: String, message: String },

    /// Record parse error
    #[error("record parse error at line {line}: {message}")]
    RecordParse { line: u64, message: String },

    // ===== Sink Errors =====
    /// Sink delivery error
    #[error("sink '{sink_name}' deliver error: {message}")]
    SinkDeliver { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl DispatchError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create replay open error
    pub fn replay_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReplayOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create record parse error
    pub fn record_parse(line: u64, message: impl Into<String>) -> Self {
        Self::RecordParse {
            line,
            message: message.into(),
        }
    }

    /// Create sink delivery error
    pub fn sink_deliver(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkDeliver {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
