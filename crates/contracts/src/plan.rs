//! DispatchPlan - Config Loader output
//!
//! Describes a complete pipeline run: where batches come from, how they are
//! queued, and which sinks receive the records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Batch source settings
    pub source: SourceConfig,

    /// Internal queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Output routing configuration
    pub sinks: Vec<SinkConfig>,
}

/// Batch source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind
    pub kind: SourceKind,

    /// Records per produced batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batch production rate (batches per second, synthetic only)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Stream identifiers (synthetic only)
    #[serde(default)]
    pub streams: Vec<String>,

    /// Replay input file, JSON-lines (replay only)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = recorded pace)
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_batch_size() -> usize {
    8
}

fn default_rate_hz() -> f64 {
    10.0
}

fn default_speed() -> f64 {
    1.0
}

/// Source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Generated batches (no external input required)
    Synthetic,
    /// Batches replayed from a recorded JSON-lines file
    Replay,
}

/// Internal queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Buffer size of the batch channel between source and dispatcher
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    100
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// File output (JSON-lines per stream)
    File,
    /// Network output (UDP)
    Network,
}

impl DispatchPlan {
    /// All configured stream names (synthetic sources only; replay streams
    /// are discovered from the recorded file)
    pub fn stream_names(&self) -> &[String] {
        &self.source.streams
    }

    /// Look up a sink configuration by name
    pub fn find_sink(&self, name: &str) -> Option<&SinkConfig> {
        self.sinks.iter().find(|s| s.name == name)
    }
}
