//! FileSink - appends records as JSON lines, one file per stream

use contracts::{DispatchError, Record, RecordSink, StreamId};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// One written line: the record plus the wall-clock write time
#[derive(Serialize)]
struct FileEntry<'a> {
    written_at: String,
    record: &'a Record,
}

/// Sink that appends records to per-stream JSON-lines files
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writers: HashMap<StreamId, BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            writers: HashMap::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn writer_for(&mut self, stream: &StreamId) -> std::io::Result<&mut BufWriter<File>> {
        match self.writers.entry(stream.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.config.base_path.join(format!("{stream}.jsonl"));
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(entry.insert(BufWriter::new(file)))
            }
        }
    }

    fn append_record(&mut self, record: &Record) -> std::io::Result<()> {
        let entry = FileEntry {
            written_at: chrono::Utc::now().to_rfc3339(),
            record,
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let writer = self.writer_for(&record.stream)?;
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn persist_record(&mut self, record: &Record) -> Result<(), DispatchError> {
        self.append_record(record).map_err(|e| {
            error!(sink = %self.name, stream = %record.stream, seq = record.seq, error = %e, "Write failed");
            DispatchError::sink_deliver(&self.name, e.to_string())
        })
    }
}

impl RecordSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_deliver",
        skip(self, record),
        fields(sink = %self.name, stream = %record.stream, seq = record.seq)
    )]
    async fn deliver(&mut self, record: &Record) -> Result<(), DispatchError> {
        self.persist_record(record)?;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), DispatchError> {
        for (stream, writer) in &mut self.writers {
            writer.flush().map_err(|e| {
                error!(sink = %self.name, stream = %stream, error = %e, "Flush failed");
                DispatchError::sink_deliver(&self.name, e.to_string())
            })?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), DispatchError> {
        for (_, mut writer) in self.writers.drain() {
            writer
                .flush()
                .map_err(|e| DispatchError::sink_deliver(&self.name, e.to_string()))?;
        }
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Payload;
    use tempfile::tempdir;

    fn record(stream: &str, seq: u64) -> Record {
        Record {
            stream: stream.into(),
            seq,
            timestamp: seq as f64,
            payload: Payload::Text(format!("body-{seq}")),
            attrs: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_file_sink_writes_per_stream_files() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let mut sink = FileSink::new("test_file", config).unwrap();
        sink.deliver(&record("alpha", 1)).await.unwrap();
        sink.deliver(&record("alpha", 2)).await.unwrap();
        sink.deliver(&record("beta", 1)).await.unwrap();
        sink.flush().await.unwrap();

        let alpha = fs::read_to_string(dir.path().join("alpha.jsonl")).unwrap();
        let beta = fs::read_to_string(dir.path().join("beta.jsonl")).unwrap();
        assert_eq!(alpha.lines().count(), 2);
        assert_eq!(beta.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_file_sink_lines_parse_back() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let mut sink = FileSink::new("test_file", config).unwrap();
        sink.deliver(&record("alpha", 7)).await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(dir.path().join("alpha.jsonl")).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(value["record"]["seq"], 7);
        assert!(value["written_at"].is_string());
    }
}
