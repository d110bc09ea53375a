//! LogSink - logs record summary via tracing

use contracts::{DispatchError, Record, RecordSink};
use tracing::{info, instrument};

/// Sink that logs record summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record_summary(&self, record: &Record) {
        info!(
            sink = %self.name,
            stream = %record.stream,
            seq = record.seq,
            timestamp = record.timestamp,
            payload_kind = record.payload.kind(),
            payload_bytes = record.payload.size(),
            attrs = record.attrs.len(),
            "Record received"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_deliver",
        skip(self, record),
        fields(sink = %self.name, seq = record.seq)
    )]
    async fn deliver(&mut self, record: &Record) -> Result<(), DispatchError> {
        self.log_record_summary(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), DispatchError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), DispatchError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Payload;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_log_sink_deliver() {
        let mut sink = LogSink::new("test_log");
        let record = Record {
            stream: "alpha".into(),
            seq: 1,
            timestamp: 1.0,
            payload: Payload::Text("hello".into()),
            attrs: HashMap::new(),
        };

        let result = sink.deliver(&record).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
